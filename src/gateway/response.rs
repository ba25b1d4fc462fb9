//! Gateway response classification and body handling.

use crate::error::{ApiError, ResponseError};
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{trace, warn};

const NOT_FOUND_MESSAGE: &str = "command not found";

/// What a gateway HTTP exchange produced.
#[derive(Debug)]
pub enum Outcome {
    /// Status < 400; body left unread for the caller.
    Success(ResponseBody),
    /// Status 404, body discarded.
    NotFound,
    /// `text/plain` error body.
    PlainTextError(String),
    /// `application/json` error body.
    StructuredError(ResponseError),
    /// Error body in any other encoding.
    UnknownEncoding { content_type: String, body: String },
}

impl Outcome {
    /// Classify a raw response. Error bodies are read and released here.
    pub async fn classify(command: &str, response: reqwest::Response) -> Self {
        let status = response.status();
        if status.as_u16() < 400 {
            return Outcome::Success(ResponseBody::new(response));
        }

        let content_type = media_type(response.headers()).to_string();
        let mut body = ResponseBody::new(response);

        let outcome = if status == StatusCode::NOT_FOUND {
            Outcome::NotFound
        } else {
            match content_type.as_str() {
                "text/plain" => Outcome::PlainTextError(read_error_text(&mut body, status).await),
                "application/json" => {
                    let mut err = ResponseError::new(command, "");
                    match body.read_all().await {
                        Ok(bytes) => match first_json_value::<serde_json::Value>(&bytes) {
                            Some(Ok(value)) => merge_error_fields(&value, &mut err, status),
                            Some(Err(e)) => {
                                warn!(status = status.as_u16(), error = %e, "Failed to decode gateway error body")
                            }
                            None => {
                                warn!(status = status.as_u16(), "Gateway error body was empty")
                            }
                        },
                        Err(e) => {
                            warn!(status = status.as_u16(), error = %e, "Failed to read gateway error body")
                        }
                    }
                    Outcome::StructuredError(err)
                }
                other => {
                    warn!(
                        status = status.as_u16(),
                        content_type = other,
                        "Unhandled gateway error encoding"
                    );
                    Outcome::UnknownEncoding {
                        content_type: other.to_string(),
                        body: read_error_text(&mut body, status).await,
                    }
                }
            }
        };

        body.close().await;
        outcome
    }

    /// Split into the success body or the gateway error it represents.
    pub fn into_result(self, command: &str) -> Result<ResponseBody, ResponseError> {
        match self {
            Outcome::Success(body) => Ok(body),
            Outcome::NotFound => Err(ResponseError::new(command, NOT_FOUND_MESSAGE)),
            Outcome::PlainTextError(text) => Err(ResponseError::new(command, text)),
            Outcome::StructuredError(err) => Err(err),
            Outcome::UnknownEncoding { content_type, body } => Err(ResponseError::new(
                command,
                format!("unknown gateway error encoding: {:?} - {:?}", content_type, body),
            )),
        }
    }
}

/// Copy `Message`, `Code` and `Command` from a JSON error body into `err`.
///
/// Each field is taken on its own; a field with the wrong type is skipped
/// with a warning and the others are still kept.
fn merge_error_fields(value: &Value, err: &mut ResponseError, status: StatusCode) {
    let Some(fields) = value.as_object() else {
        warn!(status = status.as_u16(), "Gateway error body is not a JSON object");
        return;
    };

    if let Some(message) = error_field(fields, "Message", status, Value::as_str) {
        err.message = message.to_string();
    }
    if let Some(code) = error_field(fields, "Code", status, Value::as_i64) {
        err.code = code;
    }
    if let Some(command) = error_field(fields, "Command", status, Value::as_str) {
        if !command.is_empty() {
            err.command = command.to_string();
        }
    }
}

/// Look up `key` (or its lowercase form) and convert it, warning on a type
/// mismatch. Missing and `null` fields yield `None` silently.
fn error_field<'a, T>(
    fields: &'a Map<String, Value>,
    key: &str,
    status: StatusCode,
    convert: fn(&'a Value) -> Option<T>,
) -> Option<T> {
    let value = fields
        .get(key)
        .or_else(|| fields.get(&key.to_ascii_lowercase()))
        .filter(|v| !v.is_null())?;
    let converted = convert(value);
    if converted.is_none() {
        warn!(
            status = status.as_u16(),
            field = key,
            value = %value,
            "Ignoring malformed gateway error field"
        );
    }
    converted
}

async fn read_error_text(body: &mut ResponseBody, status: StatusCode) -> String {
    match body.read_all().await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(status = status.as_u16(), error = %e, "Failed to read gateway error body");
            String::new()
        }
    }
}

/// Media type of a response with any parameters after `;` removed.
pub fn media_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .unwrap_or("")
}

/// Decode the first JSON value in `bytes`, ignoring anything after it.
pub fn first_json_value<T: DeserializeOwned>(bytes: &[u8]) -> Option<Result<T, serde_json::Error>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<T>()
        .next()
}

/// Body of a successful response.
///
/// Reading or closing consumes the underlying response; closing an already
/// consumed body does nothing.
#[derive(Debug)]
pub struct ResponseBody {
    inner: Option<reqwest::Response>,
}

impl ResponseBody {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            inner: Some(response),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Read the remaining body to the end.
    pub async fn read_all(&mut self) -> Result<Bytes, ApiError> {
        match self.inner.take() {
            Some(response) => Ok(response.bytes().await?),
            None => Ok(Bytes::new()),
        }
    }

    /// Decode the body as JSON.
    pub async fn decode_json<T: DeserializeOwned>(&mut self, command: &str) -> Result<T, ApiError> {
        let bytes = self.read_all().await?;
        match first_json_value(&bytes) {
            Some(res) => Ok(res?),
            None => Err(ApiError::EmptyResponse(command.to_string())),
        }
    }

    /// Drain whatever is left of the body and release the connection.
    pub async fn close(&mut self) {
        let Some(mut response) = self.inner.take() else {
            return;
        };
        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    trace!(error = %e, "Error draining response body");
                    break;
                }
            }
        }
    }

    /// Collect the whole body.
    pub async fn bytes(mut self) -> Result<Bytes, ApiError> {
        self.read_all().await
    }

    /// Stream the body chunk by chunk.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, ApiError>> {
        match self.inner {
            Some(response) => response.bytes_stream().map_err(ApiError::from).boxed(),
            None => stream::empty().boxed(),
        }
    }
}
