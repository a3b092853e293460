// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types for the registration endpoint.

use serde::{Deserialize, Serialize};

/// Settlement currency for a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        };
        write!(f, "{label}")
    }
}

/// Body of `POST /v1/register`: the currency plus the wallet's public key
/// as base64-encoded SPKI DER.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub currency: Currency,
    pub public_key: String,
}

/// Successful registration response: the server-assigned wallet id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), r#""USD""#);
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn register_request_uses_camel_case_public_key() {
        let body = RegisterRequest {
            currency: Currency::Usd,
            public_key: "c3BraQ==".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["publicKey"], "c3BraQ==");
    }

    #[test]
    fn register_response_parses_id() {
        let response: RegisterResponse = serde_json::from_str(r#"{"id":"w1"}"#).unwrap();
        assert_eq!(response.id, "w1");
    }
}
