//! Session shell of the terminal
//!
//! The kiosk is a single actor: operator commands, transport replies and
//! timer expiries are fed to it one at a time and it answers with a list of
//! [`Effect`]s for the caller to perform. Requests leave tagged with the
//! session epoch so replies for an ended session can be recognised and dropped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::bank::{ApiReply, PageQuery, Transport};
use crate::commands::{help_text, Command};
use crate::config::Config;
use crate::models::{LoginOutcome, Session};
use crate::services::role_service::{RoleSelection, RoleSelector};
use crate::services::transaction_service::{
    decode_page, PageUpdate, TransactionPager, MSG_END_OF_DATA, MSG_NO_TRANSACTIONS,
};
use crate::services::{auth_service, balance_service, withdraw_service};
use crate::utils::{transactions_table, IdleTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Transactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Login,
    RoleChoice,
    Main(View),
}

/// A call for the transport to make
#[derive(Clone, PartialEq, Eq)]
pub enum Request {
    Login { card_number: String, pin: String },
    Balance { account_id: i64 },
    Withdraw { account_id: i64, amount: i64 },
    TransactionsPage { account_id: i64, query: PageQuery },
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Login { card_number, .. } => f
                .debug_struct("Login")
                .field("card_number", card_number)
                .finish_non_exhaustive(),
            Request::Balance { account_id } => {
                f.debug_struct("Balance").field("account_id", account_id).finish()
            }
            Request::Withdraw { account_id, amount } => f
                .debug_struct("Withdraw")
                .field("account_id", account_id)
                .field("amount", amount)
                .finish(),
            Request::TransactionsPage { account_id, query } => f
                .debug_struct("TransactionsPage")
                .field("account_id", account_id)
                .field("query", query)
                .finish(),
        }
    }
}

/// Transport answer, labelled with the request kind it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Login(ApiReply),
    Balance(ApiReply),
    Withdraw(ApiReply),
    TransactionsPage(ApiReply),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Dispatch { epoch: u64, request: Request },
    Show(String),
    Warn(String),
    Quit,
}

pub struct Kiosk {
    screen: Screen,
    epoch: u64,
    page_size: i64,
    session: Option<Session>,
    session_id: Option<Uuid>,
    selector: RoleSelector,
    pager: TransactionPager,
    /// Last rendered transactions page
    last_page: Option<String>,
    login_in_progress: bool,
    /// Shared by balance refresh and withdrawal
    account_busy: bool,
    pin_timer: IdleTimer,
    idle_timer: IdleTimer,
}

impl Kiosk {
    pub fn new(config: &Config) -> Self {
        Self {
            screen: Screen::Start,
            epoch: 0,
            page_size: config.page_size,
            session: None,
            session_id: None,
            selector: RoleSelector::new(),
            pager: TransactionPager::new(config.page_size),
            last_page: None,
            login_in_progress: false,
            account_busy: false,
            pin_timer: IdleTimer::new(config.pin_timeout),
            idle_timer: IdleTimer::new(config.session_idle_timeout),
        }
    }

    #[cfg(test)]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[cfg(test)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn pager(&self) -> &TransactionPager {
        &self.pager
    }

    pub fn pin_timer(&self) -> &IdleTimer {
        &self.pin_timer
    }

    pub fn idle_timer(&self) -> &IdleTimer {
        &self.idle_timer
    }

    fn dispatch(&self, request: Request) -> Effect {
        debug!(epoch = self.epoch, "Dispatching {:?}", request);
        Effect::Dispatch {
            epoch: self.epoch,
            request,
        }
    }

    fn warn(message: impl Into<String>) -> Vec<Effect> {
        vec![Effect::Warn(message.into())]
    }

    /// Handle one operator command
    pub fn handle_command(&mut self, command: Command) -> Vec<Effect> {
        if !self.login_in_progress {
            self.pin_timer.touch();
        }
        self.idle_timer.touch();

        match (command, self.screen) {
            (Command::Help, _) => vec![Effect::Show(help_text())],
            (Command::Quit, _) => vec![Effect::Quit],
            (Command::Logout, Screen::Start) => Self::warn("No active session"),
            (Command::Logout, _) => self.end_session("Logged out"),

            (Command::Start, Screen::Start) => {
                self.screen = Screen::Login;
                self.pin_timer.arm();
                vec![Effect::Show("Enter card number and PIN: login <card> <pin>".to_string())]
            }
            (Command::Login { card_number, pin }, Screen::Start | Screen::Login) => {
                self.submit_login(card_number, pin)
            }
            (Command::Role(role), Screen::RoleChoice) => self.choose_role(&role),

            (Command::Balance, Screen::Main(_)) => self.request_balance(),
            (Command::Withdraw(amount), Screen::Main(_)) => self.request_withdraw(&amount),
            (Command::Transactions, Screen::Main(_)) => self.show_transactions(),
            (Command::Overview, Screen::Main(_)) => {
                self.screen = Screen::Main(View::Overview);
                self.pager.set_view_active(false);
                Vec::new()
            }
            (Command::Next, Screen::Main(View::Transactions)) => {
                let query = self.pager.load_next();
                self.page_request(query, "No older transactions")
            }
            (Command::Prev, Screen::Main(View::Transactions)) => {
                let query = self.pager.load_prev();
                self.page_request(query, "No newer transactions")
            }
            (Command::Refresh, Screen::Main(View::Transactions)) => {
                let query = self.pager.load_first();
                self.page_request(query, "")
            }

            (command, screen) => {
                debug!("{:?} not available on {:?}", command, screen);
                Self::warn("Not available on this screen")
            }
        }
    }

    fn submit_login(&mut self, card_number: String, pin: String) -> Vec<Effect> {
        self.screen = Screen::Login;
        if self.login_in_progress {
            debug!("Login already in flight, ignored");
            return Vec::new();
        }

        let card_number = card_number.trim().to_string();
        if card_number.is_empty() || pin.is_empty() {
            self.pin_timer.arm();
            return Self::warn("Card number and PIN are required.");
        }

        self.login_in_progress = true;
        self.pin_timer.disarm();
        info!("Login requested for card {}", card_number);
        vec![
            Effect::Show("Logging in...".to_string()),
            self.dispatch(Request::Login { card_number, pin }),
        ]
    }

    fn choose_role(&mut self, role: &str) -> Vec<Effect> {
        match self.selector.choose_role(role) {
            Ok(session) => self.start_session(session),
            Err(e) => {
                let roles = self.selector.available_roles().join(", ");
                vec![Effect::Warn(format!("{} (choose one of: {})", e, roles))]
            }
        }
    }

    fn start_session(&mut self, session: Session) -> Vec<Effect> {
        let session_id = Uuid::new_v4();
        info!(
            session = %session_id,
            account = session.account_id,
            role = %session.role,
            "Session started"
        );

        self.pin_timer.disarm();
        self.idle_timer.arm();
        self.screen = Screen::Main(View::Overview);
        self.pager = TransactionPager::new(self.page_size);
        self.last_page = None;
        self.account_busy = false;
        let title = session.title();
        self.session = Some(session);
        self.session_id = Some(session_id);

        let mut effects = vec![Effect::Show(title)];
        effects.extend(self.refresh_all());
        effects
    }

    fn end_session(&mut self, reason: &str) -> Vec<Effect> {
        if let Some(session_id) = self.session_id.take() {
            info!(session = %session_id, "Session ended: {}", reason);
        }
        self.epoch += 1;
        self.screen = Screen::Start;
        self.session = None;
        self.selector.reset();
        self.pager = TransactionPager::new(self.page_size);
        self.last_page = None;
        self.login_in_progress = false;
        self.account_busy = false;
        self.pin_timer.disarm();
        self.idle_timer.disarm();
        vec![Effect::Show(format!("{}. Type `start` to begin.", reason))]
    }

    fn refresh_all(&mut self) -> Vec<Effect> {
        let mut effects = self.request_balance();
        if let Some(query) = self.pager.load_first() {
            effects.extend(self.page_request(Some(query), ""));
        }
        effects
    }

    fn account_id(&self) -> Option<i64> {
        self.session.as_ref().map(|s| s.account_id)
    }

    fn request_balance(&mut self) -> Vec<Effect> {
        let Some(account_id) = self.account_id() else {
            return Vec::new();
        };
        if self.account_busy {
            debug!("Balance refresh ignored, account request in flight");
            return Vec::new();
        }
        self.account_busy = true;
        vec![self.dispatch(Request::Balance { account_id })]
    }

    fn request_withdraw(&mut self, input: &str) -> Vec<Effect> {
        let amount = match withdraw_service::validate_amount(input) {
            Ok(amount) => amount,
            Err(e) => return Self::warn(e.to_string()),
        };
        let Some(account_id) = self.account_id() else {
            return Vec::new();
        };
        if self.account_busy {
            debug!("Withdraw ignored, account request in flight");
            return Vec::new();
        }
        self.account_busy = true;
        info!(account = account_id, amount, "Withdraw requested");
        vec![self.dispatch(Request::Withdraw { account_id, amount })]
    }

    fn page_request(&self, query: Option<PageQuery>, unavailable: &str) -> Vec<Effect> {
        let Some(account_id) = self.account_id() else {
            return Vec::new();
        };
        match query {
            Some(query) => vec![self.dispatch(Request::TransactionsPage { account_id, query })],
            None if self.pager.is_busy() || unavailable.is_empty() => Vec::new(),
            None => Self::warn(unavailable),
        }
    }

    fn show_transactions(&mut self) -> Vec<Effect> {
        self.screen = Screen::Main(View::Transactions);
        let mut effects = Vec::new();
        if self.pager.set_view_active(true) {
            effects.push(Effect::Show(MSG_NO_TRANSACTIONS.to_string()));
        }
        if let Some(page) = &self.last_page {
            effects.push(Effect::Show(page.clone()));
        }
        effects
    }

    fn render_page(&self, table: String) -> String {
        format!(
            "{}\nPage {} | prev: {} | next: {}",
            table,
            self.pager.page_index() + 1,
            if self.pager.can_go_prev() { "yes" } else { "no" },
            if self.pager.can_go_next() { "yes" } else { "no" },
        )
    }

    /// Handle a transport reply for the session with `epoch`
    pub fn handle_reply(&mut self, epoch: u64, reply: Reply) -> Vec<Effect> {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Discarding reply from ended session");
            return Vec::new();
        }

        match reply {
            Reply::Login(reply) => self.on_login_reply(&reply),
            Reply::Balance(reply) => {
                self.account_busy = false;
                let Some(session) = &self.session else {
                    return Vec::new();
                };
                match balance_service::decode_balance(&reply) {
                    Ok(balance) => vec![Effect::Show(balance.status_line(&session.role))],
                    Err(e) => Self::warn(e.to_string()),
                }
            }
            Reply::Withdraw(reply) => {
                self.account_busy = false;
                match withdraw_service::decode_withdraw(&reply) {
                    Ok(result) => {
                        let mut effects = vec![Effect::Show(result.summary())];
                        effects.extend(self.refresh_all());
                        effects
                    }
                    Err(e) => {
                        warn!("Withdraw failed: {}", e);
                        Self::warn(e.to_string())
                    }
                }
            }
            Reply::TransactionsPage(reply) => self.on_page_reply(&reply),
        }
    }

    fn on_login_reply(&mut self, reply: &ApiReply) -> Vec<Effect> {
        if !self.login_in_progress {
            debug!("Login reply with no login in flight, dropped");
            return Vec::new();
        }
        self.login_in_progress = false;

        let outcome = auth_service::resolve(reply);
        let failure_message = match &outcome {
            LoginOutcome::Failure { message, .. } => Some(message.clone()),
            LoginOutcome::Success { .. } => None,
        };

        match self.selector.on_login_outcome(outcome).clone() {
            RoleSelection::Resolved(session) => self.start_session(session),
            RoleSelection::AwaitingChoice(_) => {
                self.screen = Screen::RoleChoice;
                self.pin_timer.arm();
                let roles = self.selector.available_roles().join(", ");
                vec![Effect::Show(format!("Select account: role <{}>", roles))]
            }
            RoleSelection::Idle => {
                self.pin_timer.arm();
                Self::warn(failure_message.unwrap_or_else(|| "Login failed.".to_string()))
            }
        }
    }

    fn on_page_reply(&mut self, reply: &ApiReply) -> Vec<Effect> {
        let view_active = self.screen == Screen::Main(View::Transactions);
        match self.pager.on_fetch_result(decode_page(reply)) {
            PageUpdate::Rendered { items, first_row } => {
                let page = self.render_page(transactions_table(&items, first_row));
                self.last_page = Some(page.clone());
                if view_active {
                    vec![Effect::Show(page)]
                } else {
                    Vec::new()
                }
            }
            PageUpdate::NoTransactions => {
                let page = self.render_page(transactions_table(&[], 1));
                self.last_page = Some(page.clone());
                if !view_active {
                    return Vec::new();
                }
                // The view was opened while the fetch was still in flight
                let mut effects = Vec::new();
                if self.pager.set_view_active(true) {
                    effects.push(Effect::Show(MSG_NO_TRANSACTIONS.to_string()));
                }
                effects.push(Effect::Show(page));
                effects
            }
            PageUpdate::EndOfData { notify: true } => vec![Effect::Show(MSG_END_OF_DATA.to_string())],
            PageUpdate::EndOfData { notify: false } | PageUpdate::Ignored => Vec::new(),
            PageUpdate::Failed(e) => Self::warn(e.to_string()),
        }
    }

    /// PIN entry or account choice left idle for too long
    pub fn on_pin_timeout(&mut self) -> Vec<Effect> {
        self.pin_timer.disarm();
        if !matches!(self.screen, Screen::Login | Screen::RoleChoice) {
            return Vec::new();
        }
        info!("PIN entry timed out");
        self.end_session("Timed out")
    }

    /// No operator activity on the main screen for too long
    pub fn on_idle_timeout(&mut self) -> Vec<Effect> {
        self.idle_timer.disarm();
        if self.session.is_none() {
            return Vec::new();
        }
        self.end_session("Session timed out")
    }
}

/// Reply delivered back to the kiosk's event loop
#[derive(Debug)]
pub struct Completion {
    pub epoch: u64,
    pub reply: Reply,
}

/// Performs [`Request`]s on the injected transport without blocking the kiosk
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, completions: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            transport,
            completions,
        }
    }

    pub fn dispatch(&self, epoch: u64, request: Request) {
        let transport = Arc::clone(&self.transport);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let reply = perform(transport.as_ref(), request).await;
            if completions.send(Completion { epoch, reply }).is_err() {
                debug!("Event loop gone, reply dropped");
            }
        });
    }
}

/// Run one request against the transport
pub async fn perform(transport: &dyn Transport, request: Request) -> Reply {
    match request {
        Request::Login { card_number, pin } => Reply::Login(transport.login(&card_number, &pin).await),
        Request::Balance { account_id } => Reply::Balance(transport.get_balance(account_id).await),
        Request::Withdraw { account_id, amount } => {
            Reply::Withdraw(transport.withdraw(account_id, amount).await)
        }
        Request::TransactionsPage { account_id, query } => {
            Reply::TransactionsPage(transport.get_transactions_page(account_id, &query).await)
        }
    }
}
