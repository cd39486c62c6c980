use serde::{Deserialize, Serialize};

/// The `{status, message, data}` wrapper most admin endpoints answer with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// True when the envelope reports status 200 and carries data.
    pub fn is_ok(&self) -> bool {
        self.status == Some(200) && self.data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_none() {
        let envelope: ApiEnvelope<String> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(envelope.status, None);
        assert_eq!(envelope.data, None);
        assert!(!envelope.is_ok());
    }

    #[test]
    fn ok_requires_status_and_data() {
        let envelope: ApiEnvelope<String> =
            serde_json::from_value(json!({"status": 200, "message": "ok", "data": "x"})).unwrap();
        assert!(envelope.is_ok());

        let envelope: ApiEnvelope<String> =
            serde_json::from_value(json!({"status": 200, "data": null})).unwrap();
        assert!(!envelope.is_ok());
    }
}
