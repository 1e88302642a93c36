use serde::Deserialize;
use utoipa::ToSchema;

/// Body of a publish request. The Go-style capitalized field names used on
/// the broker wire are accepted as aliases.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PublishParams {
    /// Event type name the client switches on, e.g. "message".
    #[serde(rename = "type", alias = "Type")]
    pub kind: String,
    /// Opaque event payload, passed through to the client verbatim.
    #[serde(rename = "data", alias = "Data")]
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_and_capitalized_field_names() {
        let params: PublishParams =
            serde_json::from_str(r#"{"type":"message","data":"hi"}"#).unwrap();
        assert_eq!(params.kind, "message");
        assert_eq!(params.data, "hi");

        let params: PublishParams =
            serde_json::from_str(r#"{"Type":"message","Data":"hi"}"#).unwrap();
        assert_eq!(params.kind, "message");
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(serde_json::from_str::<PublishParams>(r#"{"type":"message"}"#).is_err());
    }
}
