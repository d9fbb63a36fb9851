//! Account activation
//!
//! Submits the one-time code a new member received by email and records the
//! message to show them.

use std::sync::Arc;

use tracing::{info, warn};

use crate::services::AuthenticationService;

use super::Route;

pub const ACTIVATED_MESSAGE: &str =
    "Your account has been successfully activated.\nNow you can proceed to Login";
pub const INVALID_CODE_MESSAGE: &str = "Token has been expired or is invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Pending,
    Activated,
    Failed,
}

pub struct AccountActivation {
    auth: Arc<dyn AuthenticationService>,
    status: ActivationStatus,
}

impl AccountActivation {
    pub fn new(auth: Arc<dyn AuthenticationService>) -> Self {
        Self {
            auth,
            status: ActivationStatus::Pending,
        }
    }

    pub fn status(&self) -> ActivationStatus {
        self.status
    }

    pub fn submitted(&self) -> bool {
        self.status != ActivationStatus::Pending
    }

    /// `false` only after a failed attempt.
    pub fn is_okay(&self) -> bool {
        self.status != ActivationStatus::Failed
    }

    pub fn message(&self) -> &'static str {
        match self.status {
            ActivationStatus::Pending => "",
            ActivationStatus::Activated => ACTIVATED_MESSAGE,
            ActivationStatus::Failed => INVALID_CODE_MESSAGE,
        }
    }

    /// Where to go once the account is active.
    pub fn login_route(&self) -> Route {
        Route::new(["login"])
    }

    /// Submit the code; any failure is reported as an expired or invalid code.
    pub async fn confirm(&mut self, code: &str) -> ActivationStatus {
        self.status = match self.auth.confirm(code).await {
            Ok(()) => {
                info!("Account activated");
                ActivationStatus::Activated
            }
            Err(err) => {
                warn!(error = %err, "Account activation failed");
                ActivationStatus::Failed
            }
        };
        self.status
    }
}
