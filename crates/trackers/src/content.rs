// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Attachment downloads from the product's content store.

use std::sync::Arc;

use ts_core::{ContentFetcher, Result};

use crate::http::{expect_status, RemoteTransport, Request};

/// Fetches attachment bytes with a plain GET on the download URL.
pub struct HttpContentFetcher {
    transport: Arc<dyn RemoteTransport>,
}

impl HttpContentFetcher {
    pub fn new(transport: Arc<dyn RemoteTransport>) -> Self {
        HttpContentFetcher { transport }
    }
}

impl ContentFetcher for HttpContentFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.transport.send(Request::get(url))?;
        expect_status(&response, &[200])?;
        tracing::debug!(url, bytes = response.body.len(), "fetched attachment content");
        Ok(response.body)
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
