mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::AppContext;
use crate::config::AppConfig;

/// TenantDash - multi-tenant dashboard tooling
#[derive(Parser)]
#[command(name = "tenantdash")]
#[command(about = "TenantDash - seed, wipe and verify a multi-tenant role-based platform")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create fixture users, claims, documents and objects (idempotent)
    Seed,
    /// Delete every document and stored object (asks for confirmation)
    NukeStore,
    /// Delete every user (asks for confirmation)
    NukeUsers,
    /// Reassign role and company claims to the fixture accounts
    SetClaims,
    /// Sign in as each fixture role and probe the access rules
    CheckRules,
    /// Seed, then check rules
    Reset,
    /// Sign in and render the dashboard the account lands on
    Dashboard {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Route to open instead of the account's own dashboard
        #[arg(long)]
        route: Option<String>,
    },
    /// Sign in and print the uid, email, role and company the token carries
    Whoami {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        anyhow::bail!("failed to read .env: {e}");
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose);

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("no command given; see --help");
    };

    let ctx = AppContext::open(config)?;
    match command {
        Commands::Seed => commands::seed(&ctx).await,
        Commands::NukeStore => commands::nuke_store(&ctx).await,
        Commands::NukeUsers => commands::nuke_identities(&ctx).await,
        Commands::SetClaims => commands::set_claims(&ctx).await,
        Commands::CheckRules => commands::check_rules(&ctx).await,
        Commands::Reset => commands::reset(&ctx).await,
        Commands::Dashboard {
            email,
            password,
            route,
        } => commands::show_dashboard(&ctx, &email, &password, route.as_deref()).await,
        Commands::Whoami { email, password } => commands::whoami(&ctx, &email, &password).await,
    }
}
