use thiserror::Error;

use crate::controller::Status;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Runtime failure reported by the media element (network, codec...).
    #[error("media element error: {0}")]
    Media(String),

    /// The play request was rejected, e.g. by the autoplay policy.
    #[error("play request rejected: {0}")]
    PlayRejected(String),

    #[error("fallback frame could not be attached: {0}")]
    Fallback(String),

    #[error("dom: {0}")]
    Dom(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration is not valid JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl Error {
    /// Message shown to the listener when this error stops direct playback.
    pub fn status(&self) -> Status {
        match self {
            Error::PlayRejected(_) => Status::PlayRejected,
            _ => Status::MediaError,
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<Error> for wasm_bindgen::JsValue {
    fn from(err: Error) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_rejection_maps_to_its_own_status() {
        assert_eq!(
            Error::PlayRejected("NotAllowedError".into()).status(),
            Status::PlayRejected
        );
        assert_eq!(Error::Media("decode".into()).status(), Status::MediaError);
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::ConfigJson(_)));
    }
}
