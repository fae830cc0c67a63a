// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Inline `data:` uri decoding

use crate::error::{LoaderError, LoaderResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decoded payload of a `data:` uri
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Whether the string is a `data:` uri
pub fn is_data_uri(uri: &str) -> bool {
    uri.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decode a base64 `data:[<media type>][;params];base64,<payload>` uri
pub fn decode(uri: &str) -> LoaderResult<DataUri> {
    if !is_data_uri(uri) {
        return Err(LoaderError::InvalidDataUri("missing data: scheme".to_string()));
    }

    let (header, payload) = uri[5..]
        .split_once(',')
        .ok_or_else(|| LoaderError::InvalidDataUri("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(LoaderError::InvalidDataUri(
            "only base64 encoded payloads are supported".to_string(),
        ));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| LoaderError::InvalidDataUri(e.to_string()))?;

    Ok(DataUri {
        media_type: if media_type.is_empty() {
            "text/plain".to_string()
        } else {
            media_type.to_string()
        },
        bytes,
    })
}

/// Encode bytes as a base64 `data:` uri
pub fn encode(bytes: &[u8], media_type: &str) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}
