use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "regen")]
#[command(about = "ReGen - scan items, get AI disposal guidance, earn eco-points", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
    },
    /// Sign out and clear the cached session
    Logout,
    /// Analyze an item photo, award eco-points, and record the scan
    Scan {
        /// Path to the image file
        image: PathBuf,
    },
    /// Show the scan history, newest first
    History,
    /// Show the top profiles by eco-points
    Leaderboard,
    /// Show the current session, points, and theme
    Status,
    /// Toggle between light and dark theme
    Theme,
    /// Probe connectivity to the vision models
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let ctx = context::RuntimeContext::init().await?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&ctx, &email, &password).await,
        Commands::Signup {
            email,
            password,
            username,
        } => commands::auth::signup(&ctx, &email, &password, &username).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Scan { image } => commands::scan::run(&ctx, &image).await,
        Commands::History => commands::history::run(&ctx).await,
        Commands::Leaderboard => commands::leaderboard::run(&ctx).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Theme => commands::status::toggle_theme(&ctx).await,
        Commands::Doctor => commands::doctor::run(&ctx).await,
    }
}
