//! Response framing used by the stats backend.
//!
//! Most endpoints wrap their payload as `{result, message, data}`; a few older
//! ones return the payload bare. `Payload` accepts either.
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub result: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug)]
pub enum Payload<T> {
    Envelope(Envelope<T>),
    Bare(T),
}

impl<T: DeserializeOwned> Payload<T> {
    /// Decode a response body. An object with a `result` next to `data` or
    /// `message` is read as an envelope, so a mismatch inside `data` reports
    /// the offending field instead of a bare "no variant matched".
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let is_envelope = value
            .as_object()
            .is_some_and(|o| o.contains_key("result") && (o.contains_key("data") || o.contains_key("message")));
        if is_envelope {
            serde_json::from_value(value).map(Payload::Envelope)
        } else {
            serde_json::from_value(value).map(Payload::Bare)
        }
    }
}

impl<T> Payload<T> {
    /// Unwrap the payload; an envelope with `data: null` yields its message instead.
    pub fn into_data(self) -> Result<T, String> {
        match self {
            Payload::Bare(data) => Ok(data),
            Payload::Envelope(Envelope { data: Some(data), .. }) => Ok(data),
            Payload::Envelope(Envelope { result, message, data: None }) => {
                if message.is_empty() {
                    Err(format!("no data ({result})"))
                } else {
                    Err(message)
                }
            }
        }
    }
}

/// Admin operations answer with an envelope whose `data` is informational only.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Ack {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_data() {
        let raw = r#"{"result":"SUCCESS","message":"ok","data":["ppg","rpg"]}"#;
        let payload = Payload::<Vec<String>>::from_body(raw).unwrap();
        assert_eq!(payload.into_data().unwrap(), vec!["ppg", "rpg"]);
    }

    #[test]
    fn bare_payload_is_accepted() {
        let payload = Payload::<Vec<String>>::from_body(r#"["ppg"]"#).unwrap();
        assert_eq!(payload.into_data().unwrap(), vec!["ppg"]);
    }

    #[test]
    fn null_data_reports_message() {
        let raw = r#"{"result":"ERROR","message":"season not loaded","data":null}"#;
        let payload = Payload::<Vec<String>>::from_body(raw).unwrap();
        assert_eq!(payload.into_data().unwrap_err(), "season not loaded");

        let raw = r#"{"result":"ERROR","message":"no games"}"#;
        let payload = Payload::<Vec<String>>::from_body(raw).unwrap();
        assert_eq!(payload.into_data().unwrap_err(), "no games");
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[allow(dead_code)]
        id: i64,
    }

    #[test]
    fn mismatched_envelope_data_names_the_problem() {
        let raw = r#"{"result":"SUCCESS","message":"","data":[{"id":"seven"}]}"#;
        let err = Payload::<Vec<Row>>::from_body(raw).unwrap_err().to_string();
        assert!(err.contains("invalid type"), "{err}");
        assert!(!err.contains("untagged"), "{err}");

        let err = Payload::<Vec<Row>>::from_body(r#"[{"name":"x"}]"#).unwrap_err().to_string();
        assert!(err.contains("missing field `id`"), "{err}");
    }
}
