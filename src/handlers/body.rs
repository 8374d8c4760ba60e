use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a JSON object body into `T`.
///
/// Anything that is not an object, or whose members have the wrong types,
/// decodes to `T::default()` so every field reads as missing.
pub fn parse_body<T: DeserializeOwned + Default>(raw: &str) -> T {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::{CredentialsBody, ModulePositionBody, StatisticBody};

    #[test]
    fn test_object_fields() {
        let body: CredentialsBody = parse_body(r#"{"nom":"Alice","motdepasse":"pw","extra":[1]}"#);
        assert_eq!(body.nom.as_deref(), Some("Alice"));
        assert_eq!(body.motdepasse.as_deref(), Some("pw"));
    }

    #[test]
    fn test_escapes_are_decoded() {
        let body: CredentialsBody = parse_body(r#"{"nom":"Ligne\nsuivante é"}"#);
        assert_eq!(body.nom.as_deref(), Some("Ligne\nsuivante é"));
    }

    #[test]
    fn test_non_objects_read_as_empty() {
        for raw in ["", "not json", r#"["Alice","pw"]"#, "42", "null", r#"{"nom":"A""#] {
            let body: CredentialsBody = parse_body(raw);
            assert!(body.nom.is_none(), "{raw}");
            assert!(body.motdepasse.is_none(), "{raw}");
        }
    }

    #[test]
    fn test_integer_fields_must_fit_i32() {
        let body: StatisticBody = parse_body(r#"{"nom":"Force","valeur":18}"#);
        assert_eq!(body.valeur, Some(18));

        let body: StatisticBody = parse_body(r#"{"nom":"Force","valeur":18.5}"#);
        assert!(body.valeur.is_none());

        let body: StatisticBody = parse_body(r#"{"nom":"Force","valeur":4294967296}"#);
        assert!(body.valeur.is_none());

        let body: StatisticBody = parse_body(r#"{"nom":"Force","valeur":"18"}"#);
        assert!(body.valeur.is_none());
    }

    #[test]
    fn test_renamed_members() {
        let body: ModulePositionBody = parse_body(r#"{"module":"portrait","posX":-5,"posY":60}"#);
        assert_eq!(body.module.as_deref(), Some("portrait"));
        assert_eq!(body.pos_x, Some(-5));
        assert_eq!(body.pos_y, Some(60));
    }
}
