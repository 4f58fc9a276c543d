use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warden_cli::commands::{check, expiring, roles, validate};

#[derive(Parser)]
#[command(name = "warden", version, about = "Warden CLI: validate policies and evaluate authorization decisions")]
struct Cli {
    /// Policy file
    #[arg(long, global = true, env = "WARDEN_POLICY", default_value = "policy.yaml")]
    policy: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the policy
    Validate,
    /// Evaluate one authorization decision
    Check {
        /// Resource type (e.g. forwardusers)
        #[arg(long)]
        resource: String,
        /// Method: GET, POST, PUT, PATCH or DELETE
        #[arg(long)]
        method: String,
        /// Caller id; omit for an anonymous request
        #[arg(long)]
        user: Option<i64>,
        /// Role assignment, `ROLE` or `ROLE@RFC3339` (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// JSON file with the targeted item
        #[arg(long)]
        item: Option<PathBuf>,
        /// JSON file with related items, keyed by resource
        #[arg(long)]
        store: Option<PathBuf>,
        /// Decision time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the role grant table
    Roles {
        /// Only show this role
        role: Option<String>,
    },
    /// List role assignments that expire soon
    Expiring {
        /// YAML or JSON list of users with their role assignments
        #[arg(long)]
        assignments: PathBuf,
        /// Warning window in days
        #[arg(long, default_value_t = 14)]
        within_days: i64,
        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate => validate::run(&cli.policy),
        Commands::Check {
            resource,
            method,
            user,
            roles,
            item,
            store,
            at,
            json,
        } => {
            let request = check::CheckRequest {
                resource,
                method,
                user,
                roles,
                item,
                store,
                at,
            };
            check::run(&cli.policy, &request, json).await
        }
        Commands::Roles { role } => roles::run(&cli.policy, role.as_deref()),
        Commands::Expiring {
            assignments,
            within_days,
            at,
        } => expiring::run(&assignments, within_days, at.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}", colored::Colorize::red(format!("Error: {e}").as_str()));
        std::process::exit(1);
    }
}
