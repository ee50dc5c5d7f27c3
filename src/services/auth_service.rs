//! Login reply decoding
//!
//! One client talks to three generations of the login endpoint:
//! `{ok, accounts:[{role, accountId}]}`, the legacy `{ok, accountId}` and
//! plain `{error|message}` failures. [`resolve`] walks an ordered list of
//! rules over the reply and the first rule that matches decides the outcome.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::bank::ApiReply;
use crate::models::{LinkedAccount, LoginFailureReason, LoginOutcome, DEFAULT_ROLE};
use crate::utils::errors::{extract_error_message, INVALID_RESPONSE};

const MAX_PIN_ATTEMPTS: i64 = 3;

pub const MSG_BAD_CREDENTIALS: &str = "Incorrect card number or PIN";
pub const MSG_CARD_LOCKED: &str = "Card locked";
pub const MSG_TOO_MANY_ATTEMPTS: &str = "Card locked (too many attempts)";
pub const MSG_NO_ACCOUNTS: &str = "The card has no linked accounts";
pub const MSG_LOGIN_FAILED: &str = "Login failed";

/// Lower-case phrases the backend uses for a card locked after failed PINs
const TOO_MANY_ATTEMPTS_PHRASES: &[&str] = &["too many attempts", "liian monta yritystä"];

/// Turn a raw login reply into a [`LoginOutcome`]
pub fn resolve(reply: &ApiReply) -> LoginOutcome {
    let outcome = resolve_inner(reply);
    match &outcome {
        LoginOutcome::Success { accounts } => {
            info!("Login accepted with {} linked account(s)", accounts.len())
        }
        LoginOutcome::Failure { reason, message } => {
            debug!("Login rejected ({:?}): {}", reason, message)
        }
    }
    outcome
}

fn resolve_inner(reply: &ApiReply) -> LoginOutcome {
    if reply.is_network_failure() {
        return LoginOutcome::failure(
            LoginFailureReason::NetworkOrServerError,
            reply.error_or(MSG_LOGIN_FAILED),
        );
    }

    let body = reply.body.as_ref();

    match reply.status {
        401 => return LoginOutcome::failure(LoginFailureReason::InvalidCredentials, pin_message(body)),
        403 => return LoginOutcome::failure(LoginFailureReason::CardLocked, locked_message(body)),
        _ => {}
    }

    if !reply.ok || !(200..300).contains(&reply.status) {
        let reason = if (400..500).contains(&reply.status) {
            LoginFailureReason::InvalidCredentials
        } else {
            LoginFailureReason::InvalidServerResponse
        };
        let message = extract_error_message(body).unwrap_or_else(|| reply.error_or(MSG_LOGIN_FAILED));
        return LoginOutcome::failure(reason, message);
    }

    let Some(obj) = body.and_then(Value::as_object) else {
        return LoginOutcome::failure(LoginFailureReason::InvalidServerResponse, INVALID_RESPONSE);
    };

    if obj.get("ok").and_then(Value::as_bool) != Some(true) {
        let message = extract_error_message(body).unwrap_or_else(|| MSG_BAD_CREDENTIALS.to_string());
        return LoginOutcome::failure(LoginFailureReason::InvalidCredentials, message);
    }

    if let Some(entries) = obj.get("accounts").and_then(Value::as_array) {
        let accounts: Vec<LinkedAccount> = entries.iter().filter_map(linked_account).collect();
        if accounts.is_empty() {
            return LoginOutcome::failure(LoginFailureReason::NoLinkedAccounts, MSG_NO_ACCOUNTS);
        }
        return LoginOutcome::Success { accounts };
    }

    if let Some(account_id) = positive_id(obj) {
        return LoginOutcome::Success {
            accounts: vec![LinkedAccount::new(DEFAULT_ROLE, account_id)],
        };
    }

    LoginOutcome::failure(LoginFailureReason::InvalidServerResponse, INVALID_RESPONSE)
}

/// 401 message, counting used attempts when the backend reports what is left
fn pin_message(body: Option<&Value>) -> String {
    let attempts_left = body
        .and_then(|b| b.get("attemptsLeft"))
        .and_then(Value::as_i64)
        .filter(|left| *left >= 0);

    match attempts_left {
        Some(left) => format!("Incorrect PIN ({}/{})", MAX_PIN_ATTEMPTS - left, MAX_PIN_ATTEMPTS),
        None => MSG_BAD_CREDENTIALS.to_string(),
    }
}

fn locked_message(body: Option<&Value>) -> String {
    let message = extract_error_message(body).unwrap_or_else(|| MSG_CARD_LOCKED.to_string());
    let lowered = message.to_lowercase();
    if TOO_MANY_ATTEMPTS_PHRASES.iter().any(|p| lowered.contains(p)) {
        MSG_TOO_MANY_ATTEMPTS.to_string()
    } else {
        message
    }
}

fn linked_account(entry: &Value) -> Option<LinkedAccount> {
    let obj = entry.as_object()?;
    let account_id = positive_id(obj)?;
    let role = obj
        .get("role")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    Some(LinkedAccount::new(role, account_id))
}

fn positive_id(obj: &Map<String, Value>) -> Option<i64> {
    obj.get("accountId").and_then(Value::as_i64).filter(|id| *id > 0)
}
