//! Command-style requests against `{base}/api/v0/{command}`.

use crate::cancel::Cancellation;
use crate::error::ApiError;
use crate::gateway::multipart::{self, RequestBody};
use crate::gateway::response::Outcome;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

/// Path prefix of every gateway command.
pub const API_PREFIX: &str = "/api/v0";

/// A single gateway command invocation.
///
/// Positional arguments become repeated `arg` query parameters, followed by
/// options in key order. `encoding=json` and `stream-channels=true` are set
/// by default and may be overridden.
#[derive(Debug)]
pub struct Request {
    client: Client,
    api_base: String,
    command: String,
    args: Vec<String>,
    opts: BTreeMap<String, String>,
    body: Option<RequestBody>,
}

impl Request {
    pub fn new(client: Client, base_url: &str, command: &str, args: &[&str]) -> Self {
        let mut opts = BTreeMap::new();
        opts.insert("encoding".to_string(), "json".to_string());
        opts.insert("stream-channels".to_string(), "true".to_string());

        Self {
            client,
            api_base: format!("{}{}", base_url, API_PREFIX),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            opts,
            body: None,
        }
    }

    /// Set an option, replacing any previous value for `key`.
    pub fn option(mut self, key: &str, value: impl ToString) -> Self {
        self.opts.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach a body; it is sent as multipart form data.
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Fully resolved request URL.
    pub fn url(&self) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.api_base, self.command);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        {
            let mut query = url.query_pairs_mut();
            for arg in &self.args {
                query.append_pair("arg", arg);
            }
            for (key, value) in &self.opts {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// POST the request and classify the response.
    ///
    /// Transport failures are returned as `Err`; gateway failures come back
    /// as non-success [`Outcome`] variants with their bodies already released.
    pub async fn send(self, cancel: &Cancellation) -> Result<Outcome, ApiError> {
        cancel.run(self.dispatch()).await
    }

    /// Send the request and decode a successful JSON response into `T`.
    pub async fn exec<T: DeserializeOwned>(self, cancel: &Cancellation) -> Result<T, ApiError> {
        let command = self.command.clone();
        cancel
            .run(async move {
                let mut body = self.dispatch().await?.into_result(&command)?;
                let decoded = body.decode_json::<T>(&command).await;
                body.close().await;
                decoded
            })
            .await
    }

    async fn dispatch(self) -> Result<Outcome, ApiError> {
        let url = self.url()?;
        debug!(command = %self.command, url = %url, "Sending gateway request");

        let Request {
            client,
            command,
            body,
            ..
        } = self;

        let mut builder = client.post(url);
        if let Some(body) = body {
            builder = builder.multipart(multipart::file_form(body)?);
        }

        let response = builder.send().await?;
        debug!(command = %command, status = response.status().as_u16(), "Gateway responded");
        Ok(Outcome::classify(&command, response).await)
    }
}
