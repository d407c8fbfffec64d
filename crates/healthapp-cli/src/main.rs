use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;
mod logging;

use bootstrap::BootstrapOptions;

#[derive(Parser)]
#[command(name = "healthapp")]
#[command(about = "Health dashboard account and session management", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding accounts and the current session
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Skip the simulated request latency
    #[arg(long, global = true)]
    no_delay: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app = bootstrap::bootstrap(BootstrapOptions {
        config_path: cli.config,
        data_file: cli.data_file,
        no_delay: cli.no_delay,
    })?;

    match cli.command {
        Commands::Register {
            email,
            password,
            confirm_password,
            first_name,
            last_name,
            phone,
        } => {
            let form = healthapp_core::account::RegistrationForm {
                email,
                password,
                confirm_password,
                first_name,
                last_name,
                phone,
            };
            commands::auth::register(&app.identity, form).await?
        }
        Commands::Login { email, password } => {
            commands::auth::login(&app.identity, &email, &password).await?
        }
        Commands::Logout => commands::auth::logout(&app.identity),
        Commands::Status => commands::auth::status(&app.identity),
    }

    Ok(())
}
