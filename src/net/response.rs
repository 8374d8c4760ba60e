use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A status code plus a JSON body, as produced by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn created(body: impl Into<String>) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    /// Preflight answer: CORS headers, no body.
    pub fn no_content() -> Self {
        Self::json(StatusCode::NO_CONTENT, String::new())
    }

    /// Render the full HTTP/1.1 response, headers included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        head.push_str("Content-Type: application/json\r\n");
        for (name, value) in CORS_HEADERS {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("Content-Length: ");
        head.push_str(itoa::Buffer::new().format(self.body.len()));
        head.push_str("\r\n");
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_block(reply: &Reply) -> String {
        let raw = String::from_utf8(reply.to_bytes()).unwrap();
        raw.split("\r\n\r\n").next().unwrap().to_string()
    }

    #[test]
    fn test_status_line_and_body() {
        let reply = Reply::created(r#"{"succes":true}"#);
        let raw = String::from_utf8(reply.to_bytes()).unwrap();
        assert!(raw.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(raw.ends_with("\r\n\r\n{\"succes\":true}"));
    }

    #[test]
    fn test_content_length_counts_utf8_bytes() {
        let reply = Reply::ok(r#"{"nom":"Épée"}"#);
        let head = header_block(&reply);
        // "Épée" is 4 chars but 6 bytes
        assert_eq!(reply.body.len(), 16);
        assert!(head.contains("Content-Length: 16"));
    }

    #[test]
    fn test_cors_headers_on_errors_too() {
        let reply = Reply::json(StatusCode::NOT_FOUND, r#"{"erreur":"Route inconnue"}"#);
        let head = header_block(&reply);
        assert!(head.starts_with("HTTP/1.1 404 Not Found"));
        assert!(head.contains("Content-Type: application/json"));
        assert!(head.contains("Access-Control-Allow-Origin: *"));
        assert!(head.contains("Access-Control-Allow-Methods: GET, POST, PUT, DELETE, OPTIONS"));
        assert!(head.contains("Access-Control-Allow-Headers: Content-Type"));
        assert!(head.contains("Connection: close"));
    }

    #[test]
    fn test_no_content() {
        let reply = Reply::no_content();
        let raw = String::from_utf8(reply.to_bytes()).unwrap();
        assert!(raw.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(raw.contains("Content-Length: 0\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_write_to() {
        let mut out: Vec<u8> = Vec::new();
        let reply = Reply::ok("{}");
        reply.write_to(&mut out).await.unwrap();
        assert_eq!(out, reply.to_bytes());
    }
}
