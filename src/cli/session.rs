//! Session command handler
//!
//! Signs in against the backend and keeps the token, user and theme in the
//! local session file.

use crate::api::{ApiClient, AuthSession, Envelope, SignupForm};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use clap::{Args, Subcommand};
use std::io::{self, BufRead, Write};

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Sign in with email and password
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        username: String,
        email: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with the shared demo account
    Demo,

    /// Forget the stored token and user
    Logout,

    /// Show who is signed in
    Status,

    /// Show or change the theme preference
    Theme {
        #[arg(long, conflicts_with_all = ["light", "toggle"])]
        dark: bool,
        #[arg(long, conflicts_with = "toggle")]
        light: bool,
        #[arg(long)]
        toggle: bool,
    },
}

pub async fn run(args: SessionArgs) -> Result<()> {
    let config = Config::load()?;
    let mut store = SessionStore::load()?;
    let client = ApiClient::from_config(&config.api)?;

    match args.command {
        SessionCommand::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let envelope = client.login(&email, &password).await;
            sign_in(&mut store, envelope)
        }
        SessionCommand::Signup {
            username,
            email,
            password,
        } => {
            let form = SignupForm {
                username,
                email,
                password: password_or_prompt(password)?,
            };
            let session = client.signup(&form).await.into_result()?;
            match session.user.as_ref().and_then(|u| u.username.as_deref()) {
                Some(name) => println!("Registered {}. Log in to continue.", name),
                None => println!("Registered. Log in to continue."),
            }
            Ok(())
        }
        SessionCommand::Demo => {
            let envelope = client.demo_login().await;
            sign_in(&mut store, envelope)
        }
        SessionCommand::Logout => {
            store.clear_session()?;
            println!("Signed out");
            Ok(())
        }
        SessionCommand::Status => {
            print_status(&store);
            Ok(())
        }
        SessionCommand::Theme {
            dark,
            light,
            toggle,
        } => {
            let dark_mode = if toggle {
                store.toggle_theme()?
            } else if dark || light {
                store.set_dark_mode(dark)?;
                dark
            } else {
                store.dark_mode()
            };
            println!("theme = {}", if dark_mode { "dark" } else { "light" });
            Ok(())
        }
    }
}

fn sign_in(store: &mut SessionStore, envelope: Envelope<AuthSession>) -> Result<()> {
    let session = envelope.into_result()?;
    if session.token.is_none() {
        return Err(Error::Api("Backend returned no access token".to_string()));
    }
    store.set_session(session)?;
    print_status(store);
    Ok(())
}

fn print_status(store: &SessionStore) {
    match store.user() {
        Some(user) => println!(
            "Signed in as {} <{}>",
            user.username.as_deref().unwrap_or("unknown"),
            user.email.as_deref().unwrap_or("no email")
        ),
        None if store.is_authenticated() => println!("Signed in"),
        None => println!("Not signed in"),
    }
    println!("Session file: {}", store.path().display());
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
