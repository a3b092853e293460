// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet client for the value-transfer API.
//!
//! The client owns the bound wallet (if any) and the resolved key
//! backend, registers public keys with the server, and routes every
//! outbound request through the signing protocol in [`crate::signer`].
//!
//! Endpoint-specific call wrappers live with the consuming application;
//! the [`WalletClient::post_json`] / [`WalletClient::get_json`] seam is
//! the transport boundary they sit on.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use rsa::RsaPrivateKey;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use crate::codec;
use crate::error::ClientError;
use crate::keys::KeyProvider;
use crate::models::{Currency, RegisterRequest, RegisterResponse};
use crate::signer::{self, sign_request};
use crate::wallet::{KeyEncoding, PrivateKeyInput, Wallet, WalletInput};

const BASE_URL_ENV: &str = "WALLET_API_BASE_URL";
const WALLET_ID_ENV: &str = "WALLET_ID";
const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";
const WALLET_PRIVATE_KEY_ENCODING_ENV: &str = "WALLET_PRIVATE_KEY_ENCODING";

const REGISTER_PATH: &str = "/v1/register";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Construction options for [`WalletClient`].
pub struct ClientOptions {
    /// Base URL of the value-transfer API, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Optionally start with an already-registered wallet.
    pub wallet: Option<WalletInput>,
    /// Optionally inject a pre-resolved key backend; otherwise the client
    /// resolves one lazily on first cryptographic use.
    pub key_provider: Option<KeyProvider>,
}

/// Client-side wallet identity for the value-transfer API.
///
/// The bound wallet lives behind an `RwLock` and is replaced as a whole,
/// so concurrent signers always observe a fully constructed wallet or
/// none. Signing snapshots the wallet once per request; a registration
/// completing mid-flight never alters a signature already being computed.
pub struct WalletClient {
    base_url: String,
    http: reqwest::Client,
    wallet: Arc<RwLock<Option<Wallet>>>,
    provider: OnceCell<KeyProvider>,
}

impl WalletClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let provider = match options.key_provider {
            Some(provider) => OnceCell::new_with(Some(provider)),
            None => OnceCell::new(),
        };
        Ok(Self {
            base_url: options.base_url,
            http,
            wallet: Arc::new(RwLock::new(options.wallet.map(Wallet::from_input))),
            provider,
        })
    }

    /// Build a client from the environment.
    ///
    /// `WALLET_API_BASE_URL` is required. `WALLET_ID` and
    /// `WALLET_PRIVATE_KEY` (PKCS#8, encoded per
    /// `WALLET_PRIVATE_KEY_ENCODING`, default `hex`) together bind an
    /// existing wallet.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env_required(BASE_URL_ENV)?;
        let wallet = match (
            env_optional(WALLET_ID_ENV),
            env_optional(WALLET_PRIVATE_KEY_ENV),
        ) {
            (Some(id), Some(key)) => {
                let encoding =
                    match env_or_default(WALLET_PRIVATE_KEY_ENCODING_ENV, "hex").as_str() {
                        "hex" => KeyEncoding::Hex,
                        "base64" => KeyEncoding::Base64,
                        other => {
                            return Err(ClientError::MissingConfig(format!(
                                "{WALLET_PRIVATE_KEY_ENCODING_ENV} must be hex or base64, got {other}"
                            )))
                        }
                    };
                Some(WalletInput {
                    id,
                    private_key: PrivateKeyInput::Encoded { key, encoding },
                })
            }
            _ => None,
        };
        Self::new(ClientOptions {
            base_url,
            wallet,
            key_provider: None,
        })
    }

    /// The currently bound wallet, if any.
    pub async fn wallet(&self) -> Option<Wallet> {
        self.wallet.read().await.clone()
    }

    pub async fn wallet_id(&self) -> Option<String> {
        self.wallet
            .read()
            .await
            .as_ref()
            .map(|w| w.id().to_string())
    }

    /// Register a wallet public key with the server.
    ///
    /// Uses `private_key` as the signing key when given, deriving its
    /// public half; otherwise generates a fresh 2048-bit keypair. On a
    /// success response the returned id is bound as the client's active
    /// wallet. Re-registering on an already-bound client replaces the
    /// wallet (identity replacement, not augmentation); the registration
    /// request itself is still signed by the outgoing wallet.
    ///
    /// A non-success response binds nothing and is passed through
    /// verbatim as [`ClientError::Api`].
    pub async fn register(
        &self,
        currency: Currency,
        private_key: Option<RsaPrivateKey>,
    ) -> Result<Wallet, ClientError> {
        let provider = self.key_provider().await?;
        let (private_key, public_key) = match private_key {
            Some(key) => {
                let public_key = provider.derive_public_key(&key)?;
                (key, public_key)
            }
            None => provider.generate_keypair()?,
        };
        let spki = provider.export_public_key_der(&public_key)?;
        let request = RegisterRequest {
            currency,
            public_key: codec::encode_base64(&spki),
        };

        debug!(%currency, "registering wallet public key");
        let response = self.post_json(REGISTER_PATH, &request).await?;
        let response: RegisterResponse = serde_json::from_value(response)
            .map_err(|e| ClientError::InvalidResponse(format!("register response missing id: {e}")))?;

        let wallet = Wallet::new(response.id, PrivateKeyInput::Key(private_key));
        *self.wallet.write().await = Some(wallet.clone());
        info!(wallet_id = %wallet.id(), %currency, "wallet registered");
        Ok(wallet)
    }

    /// Export the bound wallet's private key as PKCS#8 in the requested
    /// text encoding.
    ///
    /// Fails with [`ClientError::NoWallet`] on an unbound client.
    pub async fn export_wallet(&self, encoding: KeyEncoding) -> Result<String, ClientError> {
        let wallet = self.wallet.read().await.clone().ok_or(ClientError::NoWallet)?;
        let provider = self.key_provider().await?;
        Ok(wallet.export_private_key(provider, encoding).await?)
    }

    /// POST a JSON payload. The serialized body is signed when a wallet
    /// is bound; a signing failure aborts the send.
    pub async fn post_json(
        &self,
        path: &str,
        payload: &(impl Serialize + ?Sized),
    ) -> Result<Value, ClientError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| ClientError::InvalidResponse(format!("serialize body failed: {e}")))?;
        self.send(Method::POST, path, Some(body)).await
    }

    /// GET a JSON resource. Reads are never signed.
    pub async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.send(Method::GET, path, None).await
    }

    async fn key_provider(&self) -> Result<&KeyProvider, ClientError> {
        Ok(self
            .provider
            .get_or_try_init(|| async { KeyProvider::resolve() })
            .await?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let body_bytes = body.unwrap_or_default();

        // Snapshot once; signing is a function of the wallet at the
        // moment of send.
        let wallet = self.wallet.read().await.clone();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if wallet.is_some() && signer::is_mutating(&method) {
            let provider = self.key_provider().await?;
            if let Some(signature) =
                sign_request(wallet.as_ref(), provider, &method, &body_bytes).await?
            {
                signature.apply(&mut headers)?;
            }
        }

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if signer::is_mutating(&method) {
            // The signature covers exactly these bytes.
            request = request.body(body_bytes);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("{path} returned invalid JSON: {e}")))
    }
}

fn env_required(name: &str) -> Result<String, ClientError> {
    env_optional(name).ok_or_else(|| ClientError::MissingConfig(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
