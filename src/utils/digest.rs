use sha2::{Digest, Sha256};

/// Hash a password into the digest stored in the user file.
///
/// The digest is the lowercase hex SHA-256 of the UTF-8 bytes, 64 characters
/// long, so user files written by earlier deployments stay valid.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a password against a stored digest.
pub fn verify_password(password: &str, digest: &str) -> bool {
    digests_match(&hash_password(password), digest)
}

/// Compare two digests in constant time
fn digests_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().len() == expected.as_bytes().len()
        && provided
            .as_bytes()
            .iter()
            .zip(expected.as_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
