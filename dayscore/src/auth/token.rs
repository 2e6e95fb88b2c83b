//! Stateless JWT bearer tokens.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use crate::{
    auth::authenticator::{Authenticator, Credential, Identity, bearer_token},
    db::models::users::UserDBResponse,
    errors::{Error, Result},
};

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // Username
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
}

pub struct TokenAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenAuthenticator {
    pub fn new(secret_key: &str, expiry: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            expiry,
        }
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| Error::Internal {
            operation: format!("create JWT: {e}"),
        })
    }
}

#[async_trait::async_trait]
impl Authenticator for TokenAuthenticator {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn issue(&self, user: &UserDBResponse) -> Result<Credential> {
        let expiry = chrono::Duration::from_std(self.expiry).map_err(|e| Error::Internal {
            operation: format!("convert token expiry: {e}"),
        })?;
        let now = Utc::now();
        let expires_at = now + expiry;

        let claims = TokenClaims {
            sub: user.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(Credential {
            value: self.sign(&claims)?,
            expires_at,
        })
    }

    #[instrument(skip_all, err(level = "debug"))]
    async fn validate(&self, credential: &str) -> Result<Identity> {
        let token_data = decode::<TokenClaims>(credential, &self.decoding_key, &Validation::default()).map_err(|e| match e.kind() {
            // Client errors (401) - malformed tokens, invalid claims, expired tokens
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
            | jsonwebtoken::errors::ErrorKind::InvalidIssuer
            | jsonwebtoken::errors::ErrorKind::InvalidAudience
            | jsonwebtoken::errors::ErrorKind::InvalidSubject
            | jsonwebtoken::errors::ErrorKind::ImmatureSignature
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_)
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated {
                message: Some("Invalid token".to_string()),
            },

            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::Unauthenticated {
                message: Some("Token has expired".to_string()),
            },

            // Server errors (500) - key issues, internal failures
            jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
            | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
            | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
            | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
            | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
            | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
                operation: format!("JWT verification: {e}"),
            },

            _ => Error::Internal {
                operation: format!("JWT verification (unknown error): {e}"),
            },
        })?;

        Ok(Identity {
            username: token_data.claims.sub,
        })
    }

    /// Tokens are stateless; the client discards its copy.
    async fn revoke(&self, _credential: &str) -> Result<()> {
        Ok(())
    }

    fn credential_from<'h>(&self, headers: &'h axum::http::HeaderMap) -> Option<&'h str> {
        bearer_token(headers)
    }
}
