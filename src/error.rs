//! Error type shared by every layer and the page glue.

use thiserror::Error;

pub type FxResult<T> = Result<T, FxError>;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("element #{id} is not a {expected}")]
    WrongElementType { id: String, expected: &'static str },

    #[error("{0} context unavailable")]
    MissingContext(&'static str),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("shader program failed to link: {0}")]
    ProgramLink(String),

    #[error("failed to allocate {0}")]
    GpuAlloc(&'static str),

    #[error("{what} playback rejected: {reason}")]
    Playback { what: String, reason: String },

    #[error("playlist has no tracks")]
    EmptyPlaylist,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config is not valid json: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
mod js {
    use super::FxError;
    use wasm_bindgen::{JsCast, JsValue};

    /// Best-effort text for a thrown JS value (`DOMException`s carry a message).
    pub fn describe(value: &JsValue) -> String {
        if let Some(text) = value.as_string() {
            return text;
        }
        if let Some(err) = value.dyn_ref::<js_sys::Error>() {
            return String::from(err.message());
        }
        format!("{value:?}")
    }

    impl From<JsValue> for FxError {
        fn from(value: JsValue) -> Self {
            FxError::Js(describe(&value))
        }
    }

    impl From<FxError> for JsValue {
        fn from(err: FxError) -> Self {
            JsValue::from_str(&err.to_string())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use js::describe as describe_js;
