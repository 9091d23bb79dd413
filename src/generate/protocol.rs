//! JSON bodies exchanged with the model generation service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub shape: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_the_documented_field() {
        let request = GenerateRequest {
            input: "a rolling ball".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"input":"a rolling ball"}"#);
    }

    #[test]
    fn test_response_round_trips() {
        let response: GenerateResponse = serde_json::from_str(r#"{"shape":"cone"}"#).unwrap();
        assert_eq!(response.shape, "cone");
    }

    #[test]
    fn test_response_without_shape_field_is_rejected() {
        let result = serde_json::from_str::<GenerateResponse>(r#"{"model":"cone"}"#);
        assert!(result.is_err());
    }
}
