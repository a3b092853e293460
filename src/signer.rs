// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The request-signing protocol.
//!
//! Every outbound request passes through [`sign_request`] before it is
//! sent. Pure reads and requests on an unbound client go out untouched;
//! a mutating request on a bound wallet gets a signature over the exact
//! body bytes the transport will transmit, carried in three headers:
//!
//! | Header                | Value                          |
//! |-----------------------|--------------------------------|
//! | `Wallet-Id`           | the wallet's server-assigned id |
//! | `Signature`           | base64 of the raw signature     |
//! | `Signature-Algorithm` | the literal `RSA-SHA512`        |
//!
//! Signing fails closed: when a wallet is bound and the signature cannot
//! be computed, the request must be aborted, never sent unsigned.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::debug;

use crate::codec;
use crate::keys::{KeyError, KeyProvider};
use crate::wallet::Wallet;

/// Label for the one supported scheme, RSASSA-PKCS1-v1_5 over SHA-512.
pub const SIGNATURE_ALGORITHM: &str = "RSA-SHA512";

pub const WALLET_ID_HEADER: &str = "wallet-id";
pub const SIGNATURE_HEADER: &str = "signature";
pub const SIGNATURE_ALGORITHM_HEADER: &str = "signature-algorithm";

/// Signing failed at send time. The request is aborted.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("private key unavailable for signing: {0}")]
    KeyResolution(#[source] KeyError),

    #[error("signature computation failed: {0}")]
    Backend(String),

    #[error("signature headers could not be encoded: {0}")]
    InvalidHeader(String),
}

/// The computed authentication header triple.
///
/// Built in full before any header is applied, so downstream middleware
/// never observes a partial set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub wallet_id: String,
    pub signature: String,
    pub algorithm: &'static str,
}

impl SignatureHeaders {
    /// Set all three headers on the map, or none if a value is not a
    /// legal header string.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), SigningError> {
        let wallet_id = HeaderValue::from_str(&self.wallet_id)
            .map_err(|e| SigningError::InvalidHeader(e.to_string()))?;
        let signature = HeaderValue::from_str(&self.signature)
            .map_err(|e| SigningError::InvalidHeader(e.to_string()))?;

        headers.insert(HeaderName::from_static(WALLET_ID_HEADER), wallet_id);
        headers.insert(HeaderName::from_static(SIGNATURE_HEADER), signature);
        headers.insert(
            HeaderName::from_static(SIGNATURE_ALGORITHM_HEADER),
            HeaderValue::from_static(SIGNATURE_ALGORITHM),
        );
        Ok(())
    }
}

/// Whether a method carries state-changing semantics and therefore needs
/// a signature. `GET` and `HEAD` are pure reads; everything else mutates.
pub fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Compute the authentication headers for one outbound request.
///
/// `body` must be the finalized byte sequence the transport will send;
/// the signature covers exactly those bytes. Returns `Ok(None)` when the
/// request should go out unsigned (pure read, or no wallet bound) and
/// `Err` when a bound wallet exists but the signature cannot be produced.
pub async fn sign_request(
    wallet: Option<&Wallet>,
    provider: &KeyProvider,
    method: &Method,
    body: &[u8],
) -> Result<Option<SignatureHeaders>, SigningError> {
    if !is_mutating(method) {
        debug!(%method, "read request, skipping signature");
        return Ok(None);
    }
    let Some(wallet) = wallet else {
        debug!(%method, "no wallet bound, sending unauthenticated");
        return Ok(None);
    };

    let key = wallet
        .private_key()
        .resolve(provider)
        .await
        .map_err(SigningError::KeyResolution)?;
    let signature = provider.sign(key, body)?;

    debug!(wallet_id = %wallet.id(), body_len = body.len(), "signed request body");
    Ok(Some(SignatureHeaders {
        wallet_id: wallet.id().to_string(),
        signature: codec::encode_base64(&signature),
        algorithm: SIGNATURE_ALGORITHM,
    }))
}
