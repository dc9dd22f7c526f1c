//! Account/Auth collaborator interface.
//!
//! The core never authenticates anyone; it only asks the surrounding app
//! who the current session belongs to.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;

/// The authenticated account behind the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
    pub email: String,
}

/// Supplies the identity for the current session.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, AuthError>;
}

/// Fixed identity, for tests and the CLI binary.
pub struct StaticAccount {
    identity: Identity,
}

impl StaticAccount {
    pub fn new(account_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            identity: Identity {
                account_id,
                email: email.into(),
            },
        }
    }
}

#[async_trait]
impl AccountService for StaticAccount {
    async fn current_identity(&self) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }
}
