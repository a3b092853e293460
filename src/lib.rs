// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Wallet Client - Value-Transfer API Client SDK
//!
//! This crate is the client-side identity layer for the Relational
//! value-transfer API: it manages an RSA wallet keypair, registers the
//! public key with the server, and signs every mutating HTTP request
//! with the private key so the server can attribute and verify it.
//!
//! ## Modules
//!
//! - `client` - [`WalletClient`]: registration, wallet state, transport seam
//! - `codec` - hex/base64 codecs for key and signature material
//! - `keys` - RSA backend (PKCS#1 v1.5 over SHA-512, 2048-bit keys)
//! - `signer` - the request-signing protocol and its header triple
//! - `wallet` - the wallet identity and deferred private-key handle
//!
//! One signature scheme is supported, `RSA-SHA512` (RSASSA-PKCS1-v1_5).
//! Key storage, rotation, and revocation are the caller's concern.

pub mod client;
pub mod codec;
pub mod error;
pub mod keys;
pub mod models;
pub mod signer;
pub mod wallet;

pub use client::{ClientOptions, WalletClient};
pub use error::ClientError;
pub use keys::{KeyError, KeyProvider, PublicKeyComponents};
pub use models::Currency;
pub use signer::{SignatureHeaders, SigningError, SIGNATURE_ALGORITHM};
pub use wallet::{KeyEncoding, PrivateKeyInput, Wallet, WalletInput};
