//! Inbound webhook payload.

use serde::Deserialize;

/// Alert body: `{ "text": "..." }`. Unknown fields are ignored; `text` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Alert {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_text_and_ignores_extra_fields() {
        let alert: Alert =
            serde_json::from_str(r#"{"text":"disk full","severity":"critical"}"#).unwrap();
        assert_eq!(alert.text, "disk full");
    }

    #[test]
    fn rejects_missing_or_mistyped_text() {
        assert!(serde_json::from_str::<Alert>("{}").is_err());
        assert!(serde_json::from_str::<Alert>(r#"{"text":5}"#).is_err());
        assert!(serde_json::from_str::<Alert>("not-json").is_err());
    }
}
