// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Top-level client error.

use reqwest::StatusCode;

use crate::keys::KeyError;
use crate::signer::SigningError;

/// Everything that can go wrong at the client surface.
///
/// Server-side registration failures are passed through verbatim as
/// [`ClientError::Api`]; this crate adds no retry policy of its own.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("client configuration missing: {0}")]
    MissingConfig(String),

    /// An operation that needs a bound wallet ran on an unbound client.
    /// Recoverable: register or supply a wallet first.
    #[error("no wallet is bound to this client")]
    NoWallet,

    /// Non-success response from the server, body untouched.
    #[error("request failed with {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("response was invalid: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_preserve_status_and_body() {
        let err = ClientError::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"error":"unsupported currency"}"#.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("422"));
        assert!(message.contains("unsupported currency"));
    }

    #[test]
    fn key_errors_pass_through_transparently() {
        let err = ClientError::from(KeyError::Derivation("bad modulus".to_string()));
        assert_eq!(err.to_string(), "public key derivation failed: bad modulus");
    }
}
