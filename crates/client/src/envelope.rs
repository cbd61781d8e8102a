//! Response envelope decoding.
//!
//! Every GET/POST response is `{ "success": bool, "data"?: {...}, "error"?:
//! { "code", "message" } }`. These functions are shared by the async and
//! blocking transports; neither does any I/O here.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ApiError, Error};

/// The unwrapped `data` object of a successful response.
pub type Payload = Map<String, Value>;

/// Decode a raw response body into its payload.
pub fn decode_body(body: &[u8]) -> Result<Payload, Error> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Deserialization(format!("invalid JSON response: {e}")))?;
    unwrap_envelope(value)
}

/// Unwrap a parsed envelope, turning `success: false` into an [`ApiError`].
///
/// A missing or null `data` field yields an empty payload.
pub fn unwrap_envelope(value: Value) -> Result<Payload, Error> {
    let Value::Object(mut envelope) = value else {
        return Err(Error::Deserialization(
            "response envelope is not a JSON object".to_owned(),
        ));
    };

    let success = envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !success {
        let error = envelope.remove("error").unwrap_or(Value::Null);
        let code = error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        warn!(code, message, "service returned an error response");
        return Err(ApiError::classify(code, message).into());
    }

    match envelope.remove("data") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(data)) => Ok(data),
        Some(other) => Err(Error::Deserialization(format!(
            "response data is not an object: {other}"
        ))),
    }
}

/// Deserialize the whole payload into `T`.
pub fn from_payload<T: DeserializeOwned>(payload: Payload) -> Result<T, Error> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| Error::Deserialization(e.to_string()))
}

/// Remove and deserialize a required field of the payload.
pub fn take_field<T: DeserializeOwned>(payload: &mut Payload, field: &str) -> Result<T, Error> {
    let value = payload
        .remove(field)
        .ok_or_else(|| Error::Deserialization(format!("response is missing `{field}`")))?;
    serde_json::from_value(value)
        .map_err(|e| Error::Deserialization(format!("invalid `{field}`: {e}")))
}

/// Remove and deserialize an optional field; absent and null both yield `None`.
pub fn take_optional<T: DeserializeOwned>(
    payload: &mut Payload,
    field: &str,
) -> Result<Option<T>, Error> {
    match payload.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::Deserialization(format!("invalid `{field}`: {e}"))),
    }
}
