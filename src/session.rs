//! Who is signed in.

use std::sync::{PoisonError, RwLock};

use crate::user::{Account, ActingUser};

/// Source of the current user.
pub trait Session: Send + Sync {
    fn current_user(&self) -> Option<ActingUser>;

    fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Bearer token for remote calls.
    fn token(&self) -> Option<String>;

    /// Department of the signed-in user.
    fn department(&self) -> Option<i64> {
        None
    }

    /// Forget the signed-in account.
    fn sign_out(&self);
}

/// In-process session holding the signed-in account.
#[derive(Debug, Default)]
pub struct MemorySession {
    account: RwLock<Option<Account>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(account: Account) -> Self {
        let session = Self::new();
        session.sign_in(account);
        session
    }

    pub fn sign_in(&self, account: Account) {
        tracing::info!(user = %account.id, "signed in");
        *self.account.write().unwrap_or_else(PoisonError::into_inner) = Some(account);
    }

    pub fn account(&self) -> Option<Account> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Session for MemorySession {
    fn current_user(&self) -> Option<ActingUser> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Account::acting_user)
    }

    fn token(&self) -> Option<String> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|a| a.token.clone())
    }

    fn department(&self) -> Option<i64> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|a| a.department_id)
    }

    fn sign_out(&self) {
        if let Some(account) = self
            .account
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            tracing::info!(user = %account.id, "signed out");
        }
    }
}
