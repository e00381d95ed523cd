use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ratekit")]
#[command(about = "Shipping rate engine operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check a price list file and print every issue found
    ValidateList {
        /// List file (.yaml or .json); one list or a sequence
        #[arg(long)]
        file: String,
    },

    /// Price one request and print the outcome as JSON
    Quote {
        /// Lists loaded into the in-memory repository
        #[arg(long)]
        lists: String,

        /// Tenant profile file
        #[arg(long)]
        tenant: String,

        /// Quote request file
        #[arg(long)]
        request: String,

        /// Price this list directly, whatever its status
        #[arg(long = "list-id")]
        list_id: Option<String>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Compare a list against recorded live quotes and print the drift report
    Drift {
        #[arg(long)]
        lists: String,

        #[arg(long = "list-id")]
        list_id: String,

        /// CSV of recorded quotes: key_kind,key,service_type,weight_kg,amount,vat_mode
        #[arg(long)]
        live: String,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
        Commands::ValidateList { file } => commands::validate::run(&file),
        Commands::Quote {
            lists,
            tenant,
            request,
            list_id,
            config_paths,
        } => commands::quote::run(&lists, &tenant, &request, list_id.as_deref(), &config_paths).await,
        Commands::Drift {
            lists,
            list_id,
            live,
            config_paths,
        } => commands::drift::run(&lists, &list_id, &live, &config_paths).await,
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
