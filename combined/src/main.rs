//! Combined binary for development - runs the directory in one process.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_service_lib::config::AuthServiceConfig;
use auth_service_lib::hashing::{Argon2Hasher, CredentialHasher};
use auth_service_lib::service::UserDirectoryResolver;
use auth_service_lib::DirectoryRuntime;
use common::{AppError, AppResult};
use domain::{identity, Credentials, RegistrationInput, UserView};
use user_service_lib::UserService;

#[derive(Parser)]
#[command(name = "user-directory")]
#[command(about = "User registration, login and new-user feeds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register sample users, log in, and print what a subscriber saw
    Demo {
        /// Usernames to register
        #[arg(default_values_t = ["alice".to_string(), "bob".to_string()])]
        users: Vec<String>,
    },
    /// Hash a password
    Hash {
        password: String,
        /// Override the configured cost
        #[arg(long)]
        cost: Option<u32>,
    },
    /// Verify a password against a stored hash
    Verify { password: String, hash: String },
    /// Age in whole years for a date of birth
    Age {
        dob: String,
        /// Reference date, defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Generate a fresh user id
    Id,
    /// Print a greeting
    Hello { name: Option<String> },
    /// Show the record a registration would create, without storing it
    Preview {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        dob: String,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command, AuthServiceConfig::from_env()).await {
        Ok(output) => println!("{:#}", output),
        Err(e) => {
            if e.is_client_error() {
                warn!(code = e.code(), error = %e, "Command rejected");
            } else {
                error!(code = e.code(), "Command failed");
            }
            println!(
                "{:#}",
                json!({ "error": { "code": e.code(), "message": e.user_message() } })
            );
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, config: AuthServiceConfig) -> AppResult<serde_json::Value> {
    let output = match command {
        Commands::Demo { users } => demo(config, users).await?,
        Commands::Hash { password, cost } => {
            let mut hashing = config.hashing;
            if let Some(cost) = cost {
                hashing.cost = cost;
            }
            let hasher = Argon2Hasher::new(hashing)?;
            json!({ "hash": hasher.hash(&password).await? })
        }
        Commands::Verify { password, hash } => {
            let hasher = Argon2Hasher::new(config.hashing)?;
            json!({ "verified": hasher.verify(&password, &hash).await? })
        }
        Commands::Age { dob, as_of } => {
            let as_of = match as_of {
                Some(text) => identity::parse_date(&text)?,
                None => identity::today(),
            };
            json!({ "dob": dob, "age": identity::compute_age(&dob, as_of)? })
        }
        Commands::Id => json!({ "id": identity::generate_id() }),
        Commands::Hello { name } => {
            let runtime = DirectoryRuntime::embedded()?;
            json!({ "message": runtime.resolver.greet(name) })
        }
        Commands::Preview {
            username,
            email,
            password,
            dob,
        } => {
            let runtime = DirectoryRuntime::embedded()?;
            let input = RegistrationInput::new(username, email, password, dob);
            let record = runtime.resolver.preview(input).await?;
            json!({
                "user": UserView::from(&record),
                "passwordHash": record.password_hash,
            })
        }
    };

    Ok(output)
}

async fn demo(config: AuthServiceConfig, users: Vec<String>) -> AppResult<serde_json::Value> {
    let store = user_service_lib::in_memory();
    let runtime = DirectoryRuntime::start(config, Arc::clone(&store))?;
    let resolver = Arc::clone(&runtime.resolver);

    let feed = runtime.events.subscribe();
    let watcher = tokio::spawn(async move {
        feed.into_stream()
            .map(|user| user.username)
            .collect::<Vec<_>>()
            .await
    });

    let mut registrations = Vec::with_capacity(users.len());
    let mut logins = Vec::with_capacity(users.len());
    for name in &users {
        let password = format!("{}-secret", name);
        let input = RegistrationInput::new(
            name.as_str(),
            format!("{}@example.com", name),
            password.as_str(),
            "2000-01-01",
        );
        registrations.push(resolver.register(input).await?);

        let accepted = resolver
            .login(Credentials::new(name.as_str(), password.as_str()))
            .await?;
        let rejected = resolver
            .login(Credentials::new(name.as_str(), "wrong"))
            .await?;
        logins.push(json!({ "username": name, "correct": accepted, "wrong": rejected }));
    }

    runtime.shutdown();
    let published = watcher
        .await
        .map_err(|e| AppError::internal(format!("feed watcher failed: {}", e)))?;
    let stored = store.list_users().await?.len();
    info!(published = published.len(), stored, "Demo finished");

    Ok(json!({
        "registrations": registrations,
        "logins": logins,
        "published": published,
        "stored": stored,
    }))
}
