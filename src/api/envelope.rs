use crate::error::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Standard response envelope of every API call: `{ result: { data } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ApiResult<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            status_code: Some(200),
            message: None,
            result: Some(ApiResult { data: Some(data) }),
        }
    }

    /// A successful response with nothing to apply
    pub fn empty() -> Self {
        Self {
            status_code: Some(200),
            message: None,
            result: None,
        }
    }

    /// Returns the payload, or `None` when the server sent no data
    pub fn into_data(self) -> Option<T> {
        self.result.and_then(|result| result.data)
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Parses a response body, wrapping bare payloads in an envelope
    ///
    /// Bodies that carry neither `statusCode` nor `result` are treated as
    /// the `result` part of an envelope, and `null` as an empty response.
    pub fn from_value(value: Value) -> Result<Self> {
        let is_envelope = value
            .as_object()
            .map(|obj| obj.contains_key("statusCode") || obj.contains_key("result"))
            .unwrap_or(false);

        if is_envelope {
            return Ok(serde_json::from_value(value)?);
        }
        if value.is_null() {
            return Ok(Self {
                status_code: None,
                message: None,
                result: None,
            });
        }

        Ok(Self {
            status_code: None,
            message: None,
            result: Some(serde_json::from_value(value)?),
        })
    }
}
