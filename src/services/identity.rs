//! Owner identities.
//!
//! A deployment picks one [`IdentityMode`] at start-up. Every strategy is a
//! deterministic one-way mapping from the caller's credential to an opaque
//! [`OwnerIdentity`]; the credential itself is never stored.

use crate::services::error::{DropError, DropResult};
use crate::utils::hash::calculate_hash;
use argon2::Argon2;
use base64::Engine;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;

/// What the boundary layer extracted from the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credential {
    #[default]
    Anonymous,
    /// Plaintext shared secret (password mode)
    Secret(String),
    /// Opaque token previously minted by [`SessionIdentity`]
    Session(String),
}

/// Opaque token naming who may list and fetch a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerIdentity(String);

impl OwnerIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of resolving a credential. `minted_session` is set when a new
/// anonymous session was created and the caller must persist the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub owner: OwnerIdentity,
    pub minted_session: Option<String>,
}

impl ResolvedIdentity {
    fn existing(owner: OwnerIdentity) -> Self {
        Self {
            owner,
            minted_session: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// No authentication: everybody shares one identity
    Open,
    /// Identity derived from a shared password
    Password,
    /// Identity bound to a client-held session token, minted on first use
    Session,
}

impl std::str::FromStr for IdentityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "none" => Ok(Self::Open),
            "password" => Ok(Self::Password),
            "session" | "cookie" => Ok(Self::Session),
            other => Err(format!("unknown identity mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IdentityMode::Open => "open",
            IdentityMode::Password => "password",
            IdentityMode::Session => "session",
        };
        f.write_str(name)
    }
}

pub trait IdentityResolver: Send + Sync {
    fn mode(&self) -> IdentityMode;

    fn resolve(&self, credential: &Credential) -> DropResult<ResolvedIdentity>;
}

/// Everybody is the same owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenIdentity;

pub const OPEN_IDENTITY: &str = "open";

impl IdentityResolver for OpenIdentity {
    fn mode(&self) -> IdentityMode {
        IdentityMode::Open
    }

    fn resolve(&self, _credential: &Credential) -> DropResult<ResolvedIdentity> {
        Ok(ResolvedIdentity::existing(OwnerIdentity::new(OPEN_IDENTITY)))
    }
}

const MIN_SALT_LEN: usize = 8;

/// Argon2id over the password with a deployment-wide salt.
pub struct PasswordIdentity {
    salt: Vec<u8>,
    argon2: Argon2<'static>,
}

impl PasswordIdentity {
    pub fn new(salt: &str) -> DropResult<Self> {
        if salt.len() < MIN_SALT_LEN {
            return Err(DropError::Internal(format!(
                "identity salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }
        Ok(Self {
            salt: salt.as_bytes().to_vec(),
            argon2: Argon2::default(),
        })
    }
}

impl IdentityResolver for PasswordIdentity {
    fn mode(&self) -> IdentityMode {
        IdentityMode::Password
    }

    fn resolve(&self, credential: &Credential) -> DropResult<ResolvedIdentity> {
        let password = match credential {
            Credential::Secret(password) if !password.is_empty() => password,
            _ => return Err(DropError::CredentialMissing),
        };

        let mut digest = [0u8; 32];
        self.argon2
            .hash_password_into(password.as_bytes(), &self.salt, &mut digest)
            .map_err(|e| DropError::Internal(e.to_string()))?;

        Ok(ResolvedIdentity::existing(OwnerIdentity::new(format!(
            "pw:{}",
            hex::encode(digest)
        ))))
    }
}

/// Identity bound to a random session token held by the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionIdentity;

impl SessionIdentity {
    /// Generate a URL-safe random session token
    pub fn mint_token() -> String {
        let mut bytes = [0u8; 24];
        OsRng.fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn identity_for(token: &str) -> OwnerIdentity {
        OwnerIdentity::new(format!("ss:{}", calculate_hash(token.as_bytes())))
    }
}

impl IdentityResolver for SessionIdentity {
    fn mode(&self) -> IdentityMode {
        IdentityMode::Session
    }

    fn resolve(&self, credential: &Credential) -> DropResult<ResolvedIdentity> {
        match credential {
            Credential::Session(token) if !token.is_empty() => {
                Ok(ResolvedIdentity::existing(Self::identity_for(token)))
            }
            _ => {
                let token = Self::mint_token();
                tracing::debug!("Minted new anonymous session");
                Ok(ResolvedIdentity {
                    owner: Self::identity_for(&token),
                    minted_session: Some(token),
                })
            }
        }
    }
}

/// Build the resolver selected by configuration
pub fn resolver_for(mode: IdentityMode, salt: &str) -> DropResult<Arc<dyn IdentityResolver>> {
    Ok(match mode {
        IdentityMode::Open => Arc::new(OpenIdentity),
        IdentityMode::Password => Arc::new(PasswordIdentity::new(salt)?),
        IdentityMode::Session => Arc::new(SessionIdentity),
    })
}
