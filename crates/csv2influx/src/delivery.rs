// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP delivery of Line Protocol payloads to an InfluxDB write endpoint.
//!
//! The payload of a whole input file is posted in one request, e.g. to
//! `http://localhost:8086/write?db=mydb`. Transport failures and server
//! errors are retried with a doubling backoff; client errors are not.

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Default number of attempts per payload.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled for every following one.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(200);

const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Delivery errors.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid write URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
}

impl DeliveryError {
    fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::InvalidUrl { .. } => false,
            DeliveryError::Http(e) => !e.is_builder(),
            DeliveryError::Status { status, .. } => *status >= 500,
        }
    }
}

/// An InfluxDB write endpoint.
#[derive(Debug, Clone)]
pub struct WriteEndpoint {
    url: Url,
    client: Client,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl WriteEndpoint {
    /// Create an endpoint with default retry settings.
    ///
    /// The URL must be an absolute `http` or `https` URL.
    pub fn new(url: &str) -> Result<Self, DeliveryError> {
        let invalid = |reason: String| DeliveryError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }

        Ok(Self {
            url: parsed,
            client: Client::builder().build()?,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        })
    }

    /// Set the number of attempts per payload (at least one).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Post a payload, retrying as configured.
    pub fn post(&self, payload: &str) -> Result<(), DeliveryError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;
        loop {
            match self.post_once(payload) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        "write to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        self.url, attempt, self.max_attempts, e, backoff
                    );
                    std::thread::sleep(backoff);
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn post_once(&self, payload: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_FORM)
            .body(payload.to_string())
            .send()?;

        let status = response.status();
        debug!("POST {} -> {}", self.url, status);
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
