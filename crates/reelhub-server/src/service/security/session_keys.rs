//! Signing keys for access and refresh credentials.
//!
//! Each credential kind has its own HMAC secret and its own audience, so a
//! refresh credential can never pass as an access credential or vice versa.

use std::fmt;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::Error;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceConfig;
use crate::utility::tracing_targets::SESSION_KEYS as TRACING_TARGET;

/// Issuer claim of every credential.
const ISSUER: &str = "reelhub";

/// Kind of a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on every authenticated request.
    Access,
    /// Long-lived credential exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    /// Returns the audience claim of this credential kind.
    pub const fn audience(self) -> &'static str {
        match self {
            Self::Access => "reelhub:access",
            Self::Refresh => "reelhub:refresh",
        }
    }
}

/// Claims carried by every session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Issuer, always `reelhub`.
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Audience, identifies the credential kind.
    #[serde(rename = "aud")]
    pub audience: String,
    /// Unique credential id, so two credentials issued in the same second differ.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Subject (user) id.
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl AuthClaims {
    /// Returns whether the credential is expired at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// An encoded credential and the claims it carries.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: AuthClaims,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// A freshly issued access and refresh credential for one subject.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}

/// Signing keys and lifetimes for session credentials.
///
/// Cloning is cheap; the keys are shared.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    access_token_ttl: SignedDuration,
    refresh_token_ttl: SignedDuration,
}

impl SessionKeys {
    /// Creates session keys from two distinct secrets.
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_token_ttl: SignedDuration,
        refresh_token_ttl: SignedDuration,
    ) -> Self {
        let inner = SessionKeysInner {
            access_encoding_key: EncodingKey::from_secret(access_secret),
            access_decoding_key: DecodingKey::from_secret(access_secret),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret),
            access_token_ttl,
            refresh_token_ttl,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Creates session keys from the service configuration and checks that they work.
    pub fn from_config(config: &ServiceConfig) -> crate::Result<Self> {
        let keys = Self::new(
            config.access_token_secret.as_bytes(),
            config.refresh_token_secret.as_bytes(),
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        );

        keys.validate_keys()?;

        tracing::info!(
            target: TRACING_TARGET,
            access_token_ttl_secs = config.access_token_ttl_secs,
            refresh_token_ttl_secs = config.refresh_token_ttl_secs,
            "session keys loaded"
        );

        Ok(keys)
    }

    /// Returns the configured access credential lifetime.
    #[inline]
    pub fn access_token_ttl(&self) -> SignedDuration {
        self.inner.access_token_ttl
    }

    /// Returns the configured refresh credential lifetime.
    #[inline]
    pub fn refresh_token_ttl(&self) -> SignedDuration {
        self.inner.refresh_token_ttl
    }

    fn encoding_key(&self, kind: TokenKind) -> &EncodingKey {
        match kind {
            TokenKind::Access => &self.inner.access_encoding_key,
            TokenKind::Refresh => &self.inner.refresh_encoding_key,
        }
    }

    fn decoding_key(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::Access => &self.inner.access_decoding_key,
            TokenKind::Refresh => &self.inner.refresh_decoding_key,
        }
    }

    /// Issues a credential of `kind` for `subject_id` that expires after `ttl`.
    ///
    /// Fails with [`ErrorKind::InternalServerError`] if signing fails.
    pub fn issue(&self, subject_id: Uuid, kind: TokenKind, ttl: SignedDuration) -> Result<IssuedToken> {
        let issued_at = Timestamp::now();
        let expires_at = issued_at.checked_add(ttl).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                kind = %kind,
                "credential expiry out of range"
            );
            ErrorKind::InternalServerError
                .with_message("Failed to issue credentials")
                .with_resource("session")
        })?;

        let claims = AuthClaims {
            issuer: ISSUER.to_owned(),
            audience: kind.audience().to_owned(),
            token_id: Uuid::new_v4(),
            subject_id,
            issued_at,
            expires_at,
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, self.encoding_key(kind)).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                kind = %kind,
                "failed to sign credential"
            );
            ErrorKind::InternalServerError
                .with_message("Failed to issue credentials")
                .with_resource("session")
        })?;

        Ok(IssuedToken { token, claims })
    }

    /// Issues an access and a refresh credential with the configured lifetimes.
    pub fn issue_pair(&self, subject_id: Uuid) -> Result<TokenPair> {
        let access = self.issue(subject_id, TokenKind::Access, self.access_token_ttl())?;
        let refresh = self.issue(subject_id, TokenKind::Refresh, self.refresh_token_ttl())?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.claims.expires_at,
            refresh_expires_at: refresh.claims.expires_at,
        })
    }

    /// Verifies a credential of `kind` and returns its claims.
    ///
    /// Fails with [`ErrorKind::InvalidCredential`] when the signature does not
    /// match the key of `kind`, the token is malformed, the audience or issuer
    /// is wrong, or the credential is expired.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<AuthClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[kind.audience()]);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "exp"]);

        let claims = decode::<AuthClaims>(token, self.decoding_key(kind), &validation)
            .map_err(|e| {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %e,
                    kind = %kind,
                    "credential rejected"
                );
                ErrorKind::InvalidCredential
                    .with_message("Credential is invalid or expired")
                    .with_resource("session")
            })?
            .claims;

        if claims.is_expired_at(Timestamp::now()) {
            tracing::debug!(
                target: TRACING_TARGET,
                kind = %kind,
                subject_id = %claims.subject_id,
                "credential expired"
            );
            return Err(ErrorKind::InvalidCredential
                .with_message("Credential is invalid or expired")
                .with_resource("session"));
        }

        Ok(claims)
    }

    /// Round-trips a throwaway credential of each kind with its configured lifetime.
    pub fn validate_keys(&self) -> crate::Result<()> {
        let lifetimes = [
            (TokenKind::Access, self.access_token_ttl()),
            (TokenKind::Refresh, self.refresh_token_ttl()),
        ];

        for (kind, ttl) in lifetimes {
            let issued = self
                .issue(Uuid::nil(), kind, ttl)
                .map_err(|e| Error::auth("key validation encoding failed").with_source(e))?;

            self.verify(&issued.token, kind)
                .map_err(|e| Error::auth("key validation decoding failed").with_source(e))?;
        }

        tracing::debug!(target: TRACING_TARGET, "key validation successful");
        Ok(())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("access_token_ttl", &self.inner.access_token_ttl)
            .field("refresh_token_ttl", &self.inner.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}
