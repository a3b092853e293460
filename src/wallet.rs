// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet identity: a server-assigned id bound to a private signing key.
//!
//! Callers may hand the client an already-imported key or an encoded
//! PKCS#8 string; the encoded form is imported lazily on first use through
//! a memoized [`KeyHandle`], so repeated resolution is idempotent and
//! side-effect-free.

use std::fmt;
use std::sync::Arc;

use rsa::RsaPrivateKey;
use tokio::sync::OnceCell;

use crate::codec;
use crate::keys::{KeyError, KeyProvider};

/// Text encoding for exported or caller-supplied private key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    /// Lowercase hex, two characters per byte.
    Hex,
    /// Standard base64 with padding.
    Base64,
}

/// Caller-supplied private key: either a native handle or an encoded
/// PKCS#8 string to be imported on first use.
pub enum PrivateKeyInput {
    Key(RsaPrivateKey),
    Encoded { key: String, encoding: KeyEncoding },
}

/// Caller-supplied wallet for direct construction, bypassing registration.
pub struct WalletInput {
    pub id: String,
    pub private_key: PrivateKeyInput,
}

struct EncodedKey {
    key: String,
    encoding: KeyEncoding,
}

/// A private key that may not have been imported yet.
///
/// Cloning shares the underlying cell, so every copy of a wallet resolves
/// to the same key exactly once. Hex input uses the lenient decoder for
/// compatibility with the first-generation client; base64 input is strict.
#[derive(Clone)]
pub struct KeyHandle {
    source: Option<Arc<EncodedKey>>,
    cell: Arc<OnceCell<RsaPrivateKey>>,
}

impl KeyHandle {
    fn from_input(input: PrivateKeyInput) -> Self {
        match input {
            PrivateKeyInput::Key(key) => Self {
                source: None,
                cell: Arc::new(OnceCell::new_with(Some(key))),
            },
            PrivateKeyInput::Encoded { key, encoding } => Self {
                source: Some(Arc::new(EncodedKey { key, encoding })),
                cell: Arc::new(OnceCell::new()),
            },
        }
    }

    /// Resolve the private key, importing the encoded form on first use.
    ///
    /// Concurrent callers share a single import; later calls return the
    /// memoized key.
    pub async fn resolve(&self, provider: &KeyProvider) -> Result<&RsaPrivateKey, KeyError> {
        self.cell
            .get_or_try_init(|| async {
                // The cell is pre-populated for native keys, so an empty
                // source here would mean the handle was built wrong.
                let source = self
                    .source
                    .as_ref()
                    .ok_or_else(|| KeyError::Import("key handle has no source".to_string()))?;
                let der = match source.encoding {
                    KeyEncoding::Hex => codec::decode_hex_lenient(&source.key),
                    KeyEncoding::Base64 => codec::decode_base64(&source.key)?,
                };
                provider.import_private_key_der(&der)
            })
            .await
    }

    /// Whether the key has already been imported.
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

// Key material must never reach logs; only the resolution state is shown.
impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

/// A bound wallet: server-assigned id plus the owned signing key.
///
/// The id is immutable after construction. Cheap to clone; clones share
/// the same key handle.
#[derive(Debug, Clone)]
pub struct Wallet {
    id: String,
    private_key: KeyHandle,
}

impl Wallet {
    /// Construct directly from an id and a private key input.
    pub fn new(id: impl Into<String>, private_key: PrivateKeyInput) -> Self {
        Self {
            id: id.into(),
            private_key: KeyHandle::from_input(private_key),
        }
    }

    pub fn from_input(input: WalletInput) -> Self {
        Self::new(input.id, input.private_key)
    }

    /// The server-assigned wallet id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The private key handle. The key itself stays inside the process;
    /// use [`Wallet::export_private_key`] for an explicit export.
    pub fn private_key(&self) -> &KeyHandle {
        &self.private_key
    }

    /// Export the private key as PKCS#8 DER in the requested text encoding.
    pub async fn export_private_key(
        &self,
        provider: &KeyProvider,
        encoding: KeyEncoding,
    ) -> Result<String, KeyError> {
        let key = self.private_key.resolve(provider).await?;
        let der = provider.export_private_key_der(key)?;
        Ok(match encoding {
            KeyEncoding::Hex => codec::encode_hex(&der),
            KeyEncoding::Base64 => codec::encode_base64(&der),
        })
    }
}
