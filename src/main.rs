use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod kiosk;
mod models;
mod services;
mod utils;

use api::bank::BankClient;
use config::Config;
use kiosk::{Dispatcher, Effect, Kiosk};

/// Perform the kiosk's effects. Returns false once the operator quits.
fn apply(effects: Vec<Effect>, dispatcher: &Dispatcher) -> bool {
    for effect in effects {
        match effect {
            Effect::Dispatch { epoch, request } => dispatcher.dispatch(epoch, request),
            Effect::Show(text) => println!("{}", text),
            Effect::Warn(text) => println!("! {}", text),
            Effect::Quit => return false,
        }
    }
    true
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bank_automat=debug,reqwest=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let client = match BankClient::new(&config.api_base_url, config.request_timeout) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };
    info!("Starting Bank Automat against {}", client.base_url());

    let (completions_tx, mut completions) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(Arc::new(client), completions_tx);
    let mut kiosk = Kiosk::new(&config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Bank Automat. Type `start` to begin or `help` for commands.");

    loop {
        let effects = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match commands::parse(&line) {
                    Ok(Some(command)) => kiosk.handle_command(command),
                    Ok(None) => Vec::new(),
                    Err(usage) => vec![Effect::Warn(usage)],
                },
                Ok(None) => {
                    info!("Input closed, shutting down");
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            },
            Some(completion) = completions.recv() => {
                kiosk.handle_reply(completion.epoch, completion.reply)
            }
            _ = kiosk.pin_timer().expired() => kiosk.on_pin_timeout(),
            _ = kiosk.idle_timer().expired() => kiosk.on_idle_timeout(),
        };

        if !apply(effects, &dispatcher) {
            break;
        }
    }

    info!("Bye");
}
