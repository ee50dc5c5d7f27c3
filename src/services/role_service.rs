use tracing::{debug, info};

use crate::models::{LinkedAccount, LoginOutcome, Session};
use crate::utils::errors::AppError;

/// Where the operator is in picking one of the card's accounts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleSelection {
    #[default]
    Idle,
    AwaitingChoice(Vec<LinkedAccount>),
    Resolved(Session),
}

/// Holds pending accounts until the operator picks a role
#[derive(Debug, Default)]
pub struct RoleSelector {
    state: RoleSelection,
}

impl RoleSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> &RoleSelection {
        &self.state
    }

    /// Feed a login outcome. Failures drop any pending choice.
    pub fn on_login_outcome(&mut self, outcome: LoginOutcome) -> &RoleSelection {
        self.state = match outcome {
            LoginOutcome::Failure { .. } => RoleSelection::Idle,
            LoginOutcome::Success { mut accounts } if accounts.len() == 1 => {
                let account = accounts.remove(0);
                let session = Session {
                    account_id: account.account_id,
                    role: account.role_or_default().to_string(),
                };
                info!("Single account {} resolved as {}", session.account_id, session.role);
                RoleSelection::Resolved(session)
            }
            LoginOutcome::Success { accounts } if accounts.is_empty() => RoleSelection::Idle,
            LoginOutcome::Success { accounts } => {
                debug!("{} linked accounts, waiting for role choice", accounts.len());
                RoleSelection::AwaitingChoice(accounts)
            }
        };
        &self.state
    }

    /// Distinct selectable roles in backend order
    pub fn available_roles(&self) -> Vec<String> {
        let RoleSelection::AwaitingChoice(accounts) = &self.state else {
            return Vec::new();
        };
        let mut roles: Vec<String> = Vec::new();
        for account in accounts {
            if account.role.is_empty() || account.account_id <= 0 {
                continue;
            }
            if !roles.contains(&account.role) {
                roles.push(account.role.clone());
            }
        }
        roles
    }

    /// Resolve the pending choice to the first account with `role`.
    ///
    /// An unknown or empty role leaves the selector awaiting a choice.
    pub fn choose_role(&mut self, role: &str) -> Result<Session, AppError> {
        let RoleSelection::AwaitingChoice(accounts) = &self.state else {
            return Err(AppError::Validation("No account selection pending".to_string()));
        };

        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("Select an account".to_string()));
        }

        let account = accounts
            .iter()
            .find(|a| a.role == role && a.account_id > 0)
            .ok_or_else(|| AppError::Validation(format!("No {} account linked to this card", role)))?;

        let session = Session {
            account_id: account.account_id,
            role: account.role.clone(),
        };
        info!("Operator chose {} account {}", session.role, session.account_id);
        self.state = RoleSelection::Resolved(session.clone());
        Ok(session)
    }

    pub fn reset(&mut self) {
        self.state = RoleSelection::Idle;
    }
}
