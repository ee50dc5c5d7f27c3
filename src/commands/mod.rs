pub mod help;

use crate::services::withdraw_service::QUICK_AMOUNTS;

pub use help::help_text;

/// One operator action read from the terminal
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Login { card_number: String, pin: String },
    Role(String),
    Balance,
    /// Raw amount text, validated by the kiosk before any request
    Withdraw(String),
    Transactions,
    Next,
    Prev,
    Refresh,
    Overview,
    Logout,
    Help,
    Quit,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Never print the PIN
            Command::Login { card_number, .. } => f
                .debug_struct("Login")
                .field("card_number", card_number)
                .finish_non_exhaustive(),
            Command::Start => write!(f, "Start"),
            Command::Role(role) => f.debug_tuple("Role").field(role).finish(),
            Command::Balance => write!(f, "Balance"),
            Command::Withdraw(amount) => f.debug_tuple("Withdraw").field(amount).finish(),
            Command::Transactions => write!(f, "Transactions"),
            Command::Next => write!(f, "Next"),
            Command::Prev => write!(f, "Prev"),
            Command::Refresh => write!(f, "Refresh"),
            Command::Overview => write!(f, "Overview"),
            Command::Logout => write!(f, "Logout"),
            Command::Help => write!(f, "Help"),
            Command::Quit => write!(f, "Quit"),
        }
    }
}

/// Fixed-amount shortcut such as `w40`
fn quick_amount(word: &str) -> Option<i64> {
    let amount = word.strip_prefix('w')?.parse::<i64>().ok()?;
    QUICK_AMOUNTS.contains(&amount).then_some(amount)
}

/// Parse an input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return Ok(None);
    };

    let command = command.to_lowercase();
    if let Some(amount) = quick_amount(&command) {
        return Ok(Some(Command::Withdraw(amount.to_string())));
    }

    let command = match command.as_str() {
        "start" => Command::Start,
        "login" => match args {
            [card_number, pin] => Command::Login {
                card_number: card_number.to_string(),
                pin: pin.to_string(),
            },
            _ => return Err("Usage: login <card> <pin>".to_string()),
        },
        "role" => match args {
            [role] => Command::Role(role.to_string()),
            _ => return Err("Usage: role <name>".to_string()),
        },
        "balance" | "bal" => Command::Balance,
        "withdraw" | "w" => match args {
            [amount] => Command::Withdraw(amount.to_string()),
            _ => return Err("Usage: withdraw <amount>".to_string()),
        },
        "tx" | "transactions" => Command::Transactions,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "refresh" | "r" => Command::Refresh,
        "overview" | "o" => Command::Overview,
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command `{}`. Type `help` for a list.", other)),
    };

    Ok(Some(command))
}
