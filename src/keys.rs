// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSA key backend.
//!
//! This module owns every operation that touches raw key material: keypair
//! generation, PKCS#8/SPKI import and export, PKCS#1 v1.5 signing over
//! SHA-512, and derivation of a verify-only public key from a signing key.
//!
//! The backend is resolved once per client and injected everywhere else as
//! a [`KeyProvider`] reference; nothing in this crate reaches for ambient
//! process-global crypto state.

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha512;

use crate::codec::FormatError;
use crate::signer::SigningError;

/// Modulus length for generated wallet keys.
///
/// The registration server only accepts 2048-bit RSA keys; generation uses
/// the standard 65537 public exponent.
pub const MODULUS_BITS: usize = 2048;

/// Key backend errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The operating-system entropy source could not be drawn from. Fatal;
    /// never retried.
    #[error("no cryptographic backend available: {0}")]
    Unavailable(String),

    #[error("key generation failed: {0}")]
    Generation(String),

    #[error("key import failed: {0}")]
    Import(String),

    #[error("key export failed: {0}")]
    Export(String),

    /// Deriving a public key from a validly constructed private key failed.
    /// This is an internal invariant violation, surfaced verbatim.
    #[error("public key derivation failed: {0}")]
    Derivation(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The public-only structured view of an RSA key: modulus and public
/// exponent, big-endian.
///
/// Constructed fresh from a private key, never by mutating shared state, so
/// the private exponent and CRT parameters are absent by construction.
/// Re-importing via [`PublicKeyComponents::to_public_key`] yields a key
/// that can only verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

impl PublicKeyComponents {
    /// Redact a private key down to its public components.
    pub fn from_private(key: &RsaPrivateKey) -> Self {
        Self {
            n: key.n().to_bytes_be(),
            e: key.e().to_bytes_be(),
        }
    }

    /// Re-import the components as a verify-only public key.
    pub fn to_public_key(&self) -> Result<RsaPublicKey, KeyError> {
        RsaPublicKey::new(
            BigUint::from_bytes_be(&self.n),
            BigUint::from_bytes_be(&self.e),
        )
        .map_err(|e| KeyError::Derivation(e.to_string()))
    }
}

/// Resolved cryptographic backend for RSA PKCS#1 v1.5 over SHA-512.
///
/// Obtained once via [`KeyProvider::resolve`] and cached on the client;
/// resolution is idempotent and side-effect-free, so concurrent first users
/// can share a single instance.
#[derive(Debug, Clone)]
pub struct KeyProvider {
    _resolved: (),
}

impl KeyProvider {
    /// Resolve the backend by probing the operating-system entropy source.
    ///
    /// Fails with [`KeyError::Unavailable`] when the OS RNG cannot be drawn
    /// from, in which case neither generation nor signing can work.
    pub fn resolve() -> Result<Self, KeyError> {
        let mut probe = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|e| KeyError::Unavailable(e.to_string()))?;
        Ok(Self { _resolved: () })
    }

    /// Generate a fresh 2048-bit signing keypair.
    pub fn generate_keypair(&self) -> Result<(RsaPrivateKey, RsaPublicKey), KeyError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, MODULUS_BITS)
            .map_err(|e| KeyError::Generation(e.to_string()))?;
        let public_key = self.derive_public_key(&private_key)?;
        Ok((private_key, public_key))
    }

    /// Import a private key from PKCS#8 DER bytes.
    pub fn import_private_key_der(&self, der: &[u8]) -> Result<RsaPrivateKey, KeyError> {
        RsaPrivateKey::from_pkcs8_der(der).map_err(|e| KeyError::Import(e.to_string()))
    }

    /// Import a public key from SPKI DER bytes.
    pub fn import_public_key_der(&self, der: &[u8]) -> Result<RsaPublicKey, KeyError> {
        RsaPublicKey::from_public_key_der(der).map_err(|e| KeyError::Import(e.to_string()))
    }

    /// Export a private key as PKCS#8 DER bytes.
    ///
    /// This is the only path by which private key material leaves the
    /// process, and only on an explicit caller request.
    pub fn export_private_key_der(&self, key: &RsaPrivateKey) -> Result<Vec<u8>, KeyError> {
        Ok(key
            .to_pkcs8_der()
            .map_err(|e| KeyError::Export(e.to_string()))?
            .as_bytes()
            .to_vec())
    }

    /// Export a public key as SPKI DER bytes.
    pub fn export_public_key_der(&self, key: &RsaPublicKey) -> Result<Vec<u8>, KeyError> {
        Ok(key
            .to_public_key_der()
            .map_err(|e| KeyError::Export(e.to_string()))?
            .into_vec())
    }

    /// Derive the verify-only public key for a private key.
    ///
    /// Goes through the [`PublicKeyComponents`] redaction so only the
    /// modulus and public exponent survive. This must succeed for every
    /// validly generated or imported private key; a failure here is an
    /// invariant violation ([`KeyError::Derivation`]), not a recoverable
    /// condition.
    pub fn derive_public_key(&self, key: &RsaPrivateKey) -> Result<RsaPublicKey, KeyError> {
        PublicKeyComponents::from_private(key).to_public_key()
    }

    /// Sign a message with RSASSA-PKCS1-v1_5 over SHA-512.
    ///
    /// The scheme is deterministic: identical key and message always yield
    /// an identical signature.
    pub fn sign(&self, key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let signing_key = SigningKey::<Sha512>::new(key.clone());
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| SigningError::Backend(e.to_string()))?;
        Ok(signature.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;
    use std::sync::OnceLock;

    fn provider() -> KeyProvider {
        KeyProvider::resolve().expect("backend resolves")
    }

    // Keypair generation is the slow part of this suite; share one key.
    fn test_key() -> RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| provider().generate_keypair().expect("keygen succeeds").0)
            .clone()
    }

    #[test]
    fn resolve_succeeds_on_host_with_entropy() {
        assert!(KeyProvider::resolve().is_ok());
    }

    #[test]
    fn generated_key_has_expected_modulus_length() {
        let key = test_key();
        assert_eq!(key.n().bits(), MODULUS_BITS);
        assert_eq!(key.e(), &BigUint::from(65537u32));
    }

    #[test]
    fn derived_public_key_verifies_signatures() {
        let provider = provider();
        let private_key = test_key();
        let public_key = provider.derive_public_key(&private_key).unwrap();

        let message = b"attributable request body";
        let sig_bytes = provider.sign(&private_key, message).unwrap();

        let verifying_key = VerifyingKey::<Sha512>::new(public_key);
        let signature = Signature::try_from(sig_bytes.as_slice()).unwrap();
        verifying_key.verify(message, &signature).unwrap();
    }

    #[test]
    fn signing_is_deterministic() {
        let provider = provider();
        let key = test_key();
        let first = provider.sign(&key, b"same body").unwrap();
        let second = provider.sign(&key, b"same body").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signature_length_matches_modulus() {
        let provider = provider();
        let sig = provider.sign(&test_key(), b"data").unwrap();
        assert_eq!(sig.len(), MODULUS_BITS / 8);
    }

    #[test]
    fn private_key_round_trips_through_pkcs8() {
        let provider = provider();
        let key = test_key();
        let der = provider.export_private_key_der(&key).unwrap();
        let imported = provider.import_private_key_der(&der).unwrap();
        assert_eq!(imported.n(), key.n());
        assert_eq!(imported.e(), key.e());
    }

    #[test]
    fn public_key_round_trips_through_spki() {
        let provider = provider();
        let public_key = provider.derive_public_key(&test_key()).unwrap();
        let der = provider.export_public_key_der(&public_key).unwrap();
        let imported = provider.import_public_key_der(&der).unwrap();
        assert_eq!(imported, public_key);
    }

    #[test]
    fn redaction_keeps_only_public_components() {
        let key = test_key();
        let components = PublicKeyComponents::from_private(&key);
        assert_eq!(components.n, key.n().to_bytes_be());
        assert_eq!(components.e, key.e().to_bytes_be());

        let public_key = components.to_public_key().unwrap();
        assert_eq!(public_key.n(), key.n());
    }

    #[test]
    fn import_rejects_truncated_der() {
        let provider = provider();
        let mut der = provider.export_private_key_der(&test_key()).unwrap();
        der.truncate(der.len() / 2);
        assert!(matches!(
            provider.import_private_key_der(&der),
            Err(KeyError::Import(_))
        ));
    }
}
