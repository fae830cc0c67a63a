// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Remote fetch capability

use crate::error::{LoaderError, LoaderResult};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Fetches the raw bytes behind a remote url.
///
/// Calls block until the body is received or the transport fails.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> LoaderResult<Vec<u8>>;
}

/// Blocking HTTP(S) fetcher.
///
/// No timeout is applied unless one is configured with [`HttpFetcher::with_timeout`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> LoaderResult<Vec<u8>> {
        debug!(%url, "fetching remote mesh");

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("polycloud/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoaderError::remote(url.as_str(), e))?;

        let response = client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoaderError::remote(url.as_str(), e))?;

        let body = response
            .bytes()
            .map_err(|e| LoaderError::remote(url.as_str(), e))?;

        debug!(%url, bytes = body.len(), "fetched remote mesh");
        Ok(body.to_vec())
    }
}
