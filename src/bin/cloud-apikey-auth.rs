use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use cloud_apikey_auth::config::{load_options, ClientConfig, ClientOptions};
use cloud_apikey_auth::parser::jwt::decode_claims;
use cloud_apikey_auth::utils::logging::{self, LogLevel};
use cloud_apikey_auth::{ApikeyAuthClient, CredentialResult, RefreshPolicy};
use serde_json::{json, Value};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML settings file
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    // IBMCLOUD_* variables are read by the config loader, below the settings file
    #[arg(long)]
    apikey: Option<String>,
    /// Authority (IAM) base URL
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    resource_controller_url: Option<String>,
    /// Refresh tokens ahead of expiry instead of after the margin has passed
    #[arg(long)]
    refresh_before_expiry: bool,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a bearer token
    Token {
        /// Issue a new token even if the cached one is valid
        #[arg(long)]
        force: bool,
    },
    /// Print the decoded claims of a fresh bearer token
    Claims,
    /// Print a service credential by name
    Credential { name: String },
}

const NOT_FOUND_EXIT_CODE: u8 = 2;

/// Command line flags on top of the settings file. The environment is left
/// to [`ClientConfig::resolve`] so a file value beats an env variable.
fn client_options(args: &Args, file_options: ClientOptions) -> ClientOptions {
    let mut arg_options = ClientOptions {
        apikey: args.apikey.clone(),
        url: args.url.clone(),
        resource_controller_url: args.resource_controller_url.clone(),
        ..ClientOptions::default()
    };
    if args.refresh_before_expiry {
        arg_options = arg_options.with_refresh_policy(RefreshPolicy::BeforeExpiry);
    }
    file_options.merge(arg_options)
}

fn claims_output(token: &str) -> Result<Value> {
    let claims = decode_claims(token)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).map(|t| t.to_rfc3339());
    Ok(json!({ "claims": claims, "expires_at": expires_at }))
}

fn credential_exit_code(result: &CredentialResult) -> u8 {
    if result.is_success() {
        0
    } else {
        NOT_FOUND_EXIT_CODE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // -------------------------------
    // 1. Resolve options: settings file, then command line
    // -------------------------------

    let file_options = match &args.config {
        Some(path) => load_options(path).with_context(|| format!("loading {}", path.display()))?,
        None => ClientOptions::default(),
    };
    logging::run(file_options.logging.as_ref(), args.log_level);

    // -------------------------------
    // 2. Build the client
    // -------------------------------

    let config = ClientConfig::resolve(client_options(&args, file_options))?;
    let client = ApikeyAuthClient::from_config(config)?;

    // -------------------------------
    // 3. Run the command
    // -------------------------------

    match args.command {
        Command::Token { force } => {
            let token = client.get_token(force).await?;
            println!("{}", token);
        }
        Command::Claims => {
            let token = client.get_token(false).await?;
            println!("{}", serde_json::to_string_pretty(&claims_output(&token)?)?);
        }
        Command::Credential { name } => {
            let result = client.get_service_credential_by_name(&name).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            let code = credential_exit_code(&result);
            if code != 0 {
                info!(name = %name, "service credential not found");
                return Ok(ExitCode::from(code));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
