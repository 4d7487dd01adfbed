//! Error types for the Magento 2 REST API
//!
//! Only [`check_response`] converts a failing response into an error, and the
//! client only calls it when asked to (`throw`). Everything above the request
//! executor propagates errors unchanged.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"%([A-Za-z0-9]+)").unwrap());

/// Errors returned by the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure reaching the endpoint.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Error response returned by Magento with a structured body.
    #[error("{0}")]
    Remote(RemoteError),

    /// Non-2xx response without a structured Magento body.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// A response body that could not be decoded.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// An error message placeholder with no matching parameter.
    #[error("no substitution for placeholder %{placeholder} in {message:?}")]
    Interpolation { placeholder: String, message: String },

    /// Client-side contract violation.
    #[error("{0}")]
    Assertion(String),

    /// Write attempted on a read-only client.
    #[error("{method} {path} rejected: client is read-only")]
    ReadOnly { method: String, path: String },

    /// A required configuration value was neither given nor in the environment.
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),
}

impl Error {
    /// HTTP status of the response this error was built from, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport(e) => e.status(),
            Error::Remote(e) => Some(e.status),
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Substitution parameters attached to a Magento error message.
///
/// Magento sometimes returns a map (`"%fieldName is required"` with
/// `{"fieldName": "product"}`) and sometimes a list, matched positionally
/// against 1-indexed `%1`, `%2`, ... placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    Named(serde_json::Map<String, Value>),
    Positional(Vec<Value>),
}

impl Parameters {
    /// Classify the raw `parameters` field of an error body.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Parameters::Named(map.clone())),
            Value::Array(list) => Some(Parameters::Positional(list.clone())),
            _ => None,
        }
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Parameters::Named(map) => map.get(name).cloned(),
            Parameters::Positional(list) => name
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| list.get(index).cloned()),
        }
    }
}

/// An error reported by Magento itself: a non-2xx response whose body is a
/// JSON object with a `message` field.
#[derive(Debug, Clone)]
pub struct RemoteError {
    text: String,
    /// Raw message, with placeholders unsubstituted.
    pub message: String,
    pub parameters: Option<Parameters>,
    /// Server-side stack trace, when Magento runs in developer mode.
    pub trace: Option<String>,
    pub status: StatusCode,
    /// Raw response body, for introspection.
    pub body: String,
}

impl RemoteError {
    pub fn new(
        message: String,
        parameters: Option<Parameters>,
        trace: Option<String>,
        status: StatusCode,
        body: String,
    ) -> Result<Self> {
        let text = build_exception_text(&message, parameters.as_ref())?;
        Ok(Self { text, message, parameters, trace, status, body })
    }

    /// Message with all placeholders substituted.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Substitute the placeholders of a Magento error message.
///
/// A message without parameters is returned unchanged. A placeholder with no
/// matching parameter is an [`Error::Interpolation`], not silently ignored.
pub fn build_exception_text(message: &str, parameters: Option<&Parameters>) -> Result<String> {
    let Some(parameters) = parameters else {
        return Ok(message.to_string());
    };

    let mut text = String::with_capacity(message.len());
    let mut last_end = 0;
    for captures in PLACEHOLDER.captures_iter(message) {
        let placeholder = captures.get(0).unwrap();
        let name = &captures[1];
        let Some(value) = parameters.lookup(name) else {
            return Err(Error::Interpolation {
                placeholder: name.to_string(),
                message: message.to_string(),
            });
        };
        text.push_str(&message[last_end..placeholder.start()]);
        text.push_str(&value_to_text(&value));
        last_end = placeholder.end();
    }
    text.push_str(&message[last_end..]);
    Ok(text)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the error for a non-2xx response body.
///
/// Bodies that are JSON objects carrying a `message` become
/// [`Error::Remote`]; everything else falls back to [`Error::Http`].
pub fn error_for_status(status: StatusCode, body: String) -> Error {
    if body.starts_with('{') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
            if let Some(Value::String(message)) = map.get("message") {
                let parameters = map.get("parameters").and_then(Parameters::from_value);
                let trace = map.get("trace").and_then(Value::as_str).map(String::from);
                return match RemoteError::new(message.clone(), parameters, trace, status, body) {
                    Ok(remote) => Error::Remote(remote),
                    Err(interpolation) => interpolation,
                };
            }
        }
    }
    Error::Http { status, body }
}

/// Pass through successful responses, turn failing ones into errors.
///
/// The failing response's body is consumed to build the error, and kept on it
/// so callers never need to re-fetch anything.
pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await?;
    Err(error_for_status(status, body))
}
