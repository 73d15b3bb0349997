//! chatsheet - command-line client for the chatsheet backend.
//!
//! Logs in, signs up and links LinkedIn accounts. The bearer token is kept
//! in the configured token store between invocations.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chatsheet_core::config::StoreKind;
use chatsheet_core::models::{LinkOutcome, LoginResponse};
use chatsheet_core::{ApiClient, ApiError, Config};

#[derive(Debug, Parser)]
#[command(name = "chatsheet", version, about = "Chatsheet backend client")]
struct Cli {
    /// Backend base URL (overrides config and CHATSHEET_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Token store backend: memory, file or keyring
    #[arg(long, global = true)]
    token_store: Option<StoreKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the session token
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a new account
    Signup {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the session token (no request is sent)
    Logout,
    /// Show whether a session token is stored
    Status,
    /// List linked accounts
    Accounts,
    /// Link a LinkedIn account with username and password
    LinkBasic {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Link a LinkedIn account with a session cookie
    LinkCookie {
        /// Value of the `li_at` cookie
        access_token: String,
        /// User agent of the browser the cookie came from
        #[arg(long)]
        user_agent: String,
    },
    /// Solve a pending checkpoint (2FA code, OTP or phone number)
    Checkpoint { account_id: String, code: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password(prompt).context("Failed to read password"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line stderr summary of a login attempt
fn login_summary(email: &str, response: &LoginResponse, stored: bool) -> String {
    match (response.token(), stored) {
        (Some(_), true) => format!("Logged in as {}", email),
        (Some(_), false) => {
            "Login succeeded but the session token could not be stored".to_string()
        }
        (None, _) => "Login returned no session token; nothing was stored".to_string(),
    }
}

fn print_outcome(outcome: &LinkOutcome) -> Result<()> {
    if let LinkOutcome::CheckpointRequired {
        account_id,
        checkpoint_type,
    } = outcome
    {
        eprintln!(
            "Checkpoint required ({}). Run: chatsheet checkpoint {} <code>",
            checkpoint_type, account_id
        );
    }
    print_json(outcome)
}

async fn run(cli: Cli, client: &ApiClient) -> Result<()> {
    match cli.command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password, "Password: ")?;
            let response = client.login(&email, &password).await?;
            let stored = client.is_authenticated();
            eprintln!("{}", login_summary(&email, &response, stored));
            if let Some(message) = response.message {
                info!(%message, "Login response");
            }
        }
        Command::Signup { email, password } => {
            let password = password_or_prompt(password, "Choose a password: ")?;
            let response = client.signup(&email, &password).await?;
            print_json(&response.user)?;
        }
        Command::Logout => {
            client.logout()?;
            eprintln!("Logged out");
        }
        Command::Status => {
            println!("{}", client.auth_state());
        }
        Command::Accounts => {
            let accounts = client.list_accounts().await?;
            print_json(&accounts)?;
        }
        Command::LinkBasic { username, password } => {
            let password = password_or_prompt(password, "LinkedIn password: ")?;
            let outcome = client.connect_linkedin_basic(&username, &password).await?;
            print_outcome(&outcome)?;
        }
        Command::LinkCookie {
            access_token,
            user_agent,
        } => {
            let outcome = client
                .connect_linkedin_cookie(&access_token, &user_agent)
                .await?;
            print_outcome(&outcome)?;
        }
        Command::Checkpoint { account_id, code } => {
            let outcome = client.solve_checkpoint(&account_id, &code).await?;
            print_outcome(&outcome)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.base_url.clone() {
        config.base_url = url;
    }
    if let Some(kind) = cli.token_store {
        config.token_store = kind;
    }

    let store = config.open_store()?;
    let client = ApiClient::new(config, store)?;

    if let Err(e) = run(cli, &client).await {
        if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized(_))) {
            eprintln!("Session expired or invalid. Run `chatsheet login` again.");
        }
        return Err(e);
    }
    Ok(())
}
