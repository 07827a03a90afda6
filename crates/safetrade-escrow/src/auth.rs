//! Authorization Gate
//!
//! Resolves the caller's credential to an identity and requires the
//! administrator role before any escrow operation runs. Every entry point
//! calls [`AuthorizationGate::authorize`] first; a failure here means no
//! read or write has happened yet.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use safetrade_common::{EscrowError, Result};

/// Role attached to a resolved identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

/// An identity resolved from a credential
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// A caller confirmed to hold the administrator role
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user_id: Uuid,
    pub name: String,
}

/// Trait for identity backends
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a bearer token to an account, `None` if the token is
    /// unknown or expired. `Err` is reserved for backend failure.
    async fn resolve(&self, token: &str) -> Result<Option<UserAccount>>;
}

/// Resolver backed by a fixed token → account table
///
/// Suits operator deployments where admin credentials are provisioned via
/// configuration; anything larger plugs its identity provider in behind
/// [`IdentityResolver`].
pub struct StaticTokenResolver {
    accounts: HashMap<String, UserAccount>,
}

impl StaticTokenResolver {
    pub fn new(accounts: HashMap<String, UserAccount>) -> Self {
        Self { accounts }
    }

    /// Build a resolver granting the admin role to each listed token
    pub fn from_admin_tokens(tokens: &[String]) -> Self {
        let accounts = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                (
                    token.clone(),
                    UserAccount {
                        id: Uuid::now_v7(),
                        name: format!("operator-{}", i + 1),
                        role: Role::Admin,
                    },
                )
            })
            .collect();
        Self { accounts }
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenResolver {
    async fn resolve(&self, token: &str) -> Result<Option<UserAccount>> {
        Ok(self.accounts.get(token).cloned())
    }
}

/// Verifies the caller is an authenticated administrator
pub struct AuthorizationGate {
    resolver: Arc<dyn IdentityResolver>,
}

impl AuthorizationGate {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve the credential and require the admin role
    pub async fn authorize(&self, token: Option<&str>) -> Result<AdminIdentity> {
        let token = token.ok_or(EscrowError::Unauthenticated)?;

        let account = self
            .resolver
            .resolve(token)
            .await?
            .ok_or(EscrowError::Unauthenticated)?;

        if account.role != Role::Admin {
            warn!(user = %account.name, "non-admin caller rejected");
            return Err(EscrowError::Forbidden);
        }

        debug!(user = %account.name, "admin authorized");
        Ok(AdminIdentity {
            user_id: account.id,
            name: account.name,
        })
    }
}
