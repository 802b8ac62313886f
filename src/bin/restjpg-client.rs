//! rest-jpg command-line client
//!
//! Drives a running rest-jpg server over HTTP: registers users and OAuth
//! clients, runs the implicit grant, and inspects or revokes bearer tokens.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Register a user, then a client
//! restjpg-client register-user --id alice --name "Alice" --new-password hunter2
//! restjpg-client register-client --name "Gallery" --redirect-uri https://gallery.example/cb
//!
//! # Grant the client a write token on behalf of alice
//! restjpg-client --user alice --password hunter2 authorize \
//!   --client-id '$AbC...' --redirect-uri https://gallery.example/cb --scopes write
//!
//! # Inspect the token, then revoke it
//! restjpg-client --token "$TOKEN" token-info
//! restjpg-client --user alice --password hunter2 revoke-token "$TOKEN"
//! ```
//!
//! Client credentials are passed the same way as user credentials: the client
//! id (with its leading `$`) as `--user` and the secret as `--password`.
//!
//! ## Environment Variables
//!
//! - `RESTJPG_BASE_URL`: server base URL (alternative to --base-url)
//! - `RESTJPG_USER`, `RESTJPG_PASSWORD`: Basic credentials
//! - `RESTJPG_TOKEN`: bearer token
//!
//! Exit codes: 0 success, 1 network or usage error, 2 request rejected by the
//! server, 3 authentication failure.

use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder, StatusCode, header::LOCATION, redirect};
use std::process;
use thiserror::Error;
use url::Url;

#[derive(Parser)]
#[command(
    name = "restjpg-client",
    about = "Command-line client for the rest-jpg image service",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Base URL of the rest-jpg server
    #[arg(long, env = "RESTJPG_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// User id (or client id) for Basic authentication
    #[arg(long, env = "RESTJPG_USER")]
    user: Option<String>,

    /// Password (or client secret) for Basic authentication
    #[arg(long, env = "RESTJPG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Bearer token, used when no Basic credentials are given
    #[arg(long, env = "RESTJPG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print request and status details to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    RegisterUser(RegisterUserArgs),
    /// List registered users
    ListUsers,
    /// Delete a user together with their images and tokens
    DeleteUser(IdArgs),
    /// Register a new OAuth client
    RegisterClient(RegisterClientArgs),
    /// Show a registered client
    GetClient(IdArgs),
    /// Delete a client and revoke its tokens (client credentials)
    DeleteClient(IdArgs),
    /// Grant a client a token through the implicit flow and print it
    Authorize(AuthorizeArgs),
    /// Describe the bearer token passed with --token
    TokenInfo,
    /// List a user's tokens
    ListTokens(IdArgs),
    /// Revoke a token
    RevokeToken(TokenArgs),
}

#[derive(Args)]
struct RegisterUserArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    /// Password for the new account
    #[arg(long)]
    new_password: String,
}

#[derive(Args)]
struct RegisterClientArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    redirect_uri: String,
}

#[derive(Args)]
struct IdArgs {
    id: String,
}

#[derive(Args)]
struct TokenArgs {
    value: String,
}

#[derive(Args)]
struct AuthorizeArgs {
    #[arg(long)]
    client_id: String,
    #[arg(long)]
    redirect_uri: String,
    /// Space separated scopes, e.g. "read write"
    #[arg(long, default_value = "read")]
    scopes: String,
    #[arg(long)]
    state: Option<String>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {0}: {1}")]
    Rejected(StatusCode, String),

    #[error("Authentication failed with status {0}: {1}")]
    Authentication(StatusCode, String),

    #[error("Error: {0}")]
    General(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Network(_) | AppError::General(_) => 1,
            AppError::Rejected(..) => 2,
            AppError::Authentication(..) => 3,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        eprintln!("{}", err);
        process::exit(err.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let http = cli.http()?;
    match &cli.command {
        Commands::RegisterUser(args) => {
            let form = [
                ("id", args.id.as_str()),
                ("name", args.name.as_str()),
                ("password", args.new_password.as_str()),
            ];
            print_response(cli, http.post(cli.url("/register")).form(&form)).await
        }
        Commands::ListUsers => print_response(cli, cli.authed(http.get(cli.url("/users")))).await,
        Commands::DeleteUser(args) => {
            let request = http.delete(cli.url(&format!("/user/{}", args.id)));
            print_response(cli, cli.authed(request)).await
        }
        Commands::RegisterClient(args) => {
            let form = [
                ("name", args.name.as_str()),
                ("redirect_uri", args.redirect_uri.as_str()),
            ];
            print_response(cli, http.post(cli.url("/oauth/register-client")).form(&form)).await
        }
        Commands::GetClient(args) => {
            let request = http.get(cli.url(&format!("/oauth/client/{}", args.id)));
            print_response(cli, cli.authed(request)).await
        }
        Commands::DeleteClient(args) => {
            let request = http.delete(cli.url(&format!("/oauth/client/{}", args.id)));
            print_response(cli, cli.authed(request)).await
        }
        Commands::Authorize(args) => authorize(cli, &http, args).await,
        Commands::TokenInfo => print_response(cli, cli.authed(http.get(cli.url("/oauth/token")))).await,
        Commands::ListTokens(args) => {
            let request = http.get(cli.url(&format!("/user/{}/tokens", args.id)));
            print_response(cli, cli.authed(request)).await
        }
        Commands::RevokeToken(args) => {
            let request = http.delete(cli.url(&format!("/oauth/token/{}", args.value)));
            print_response(cli, cli.authed(request)).await
        }
    }
}

impl Cli {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// HTTP client that never follows redirects, so grant locations can be read
    fn http(&self) -> Result<Client, AppError> {
        Ok(Client::builder().redirect(redirect::Policy::none()).build()?)
    }

    /// Attach Basic credentials when given, else the bearer token
    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.user, &self.token) {
            (Some(user), _) => request.basic_auth(user, self.password.as_deref()),
            (None, Some(token)) => request.bearer_auth(token),
            (None, None) => request,
        }
    }
}

/// Send the request and print the XML body of a successful response
async fn print_response(cli: &Cli, request: RequestBuilder) -> Result<(), AppError> {
    let response = request.send().await?;
    let status = response.status();
    if cli.verbose {
        eprintln!("{} {}", status, response.url());
    }

    let body = response.text().await?;
    check_status(status, body.clone())?;
    println!("{}", body);
    Ok(())
}

fn check_status(status: StatusCode, body: String) -> Result<(), AppError> {
    if status.is_success() || status.is_redirection() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED {
        Err(AppError::Authentication(status, body))
    } else {
        Err(AppError::Rejected(status, body))
    }
}

/// Run the implicit grant and print the token found in the redirect location
async fn authorize(cli: &Cli, http: &Client, args: &AuthorizeArgs) -> Result<(), AppError> {
    let mut query = vec![
        ("response_type", "token"),
        ("client_id", args.client_id.as_str()),
        ("redirect_uri", args.redirect_uri.as_str()),
        ("scopes", args.scopes.as_str()),
    ];
    if let Some(state) = args.state.as_deref() {
        query.push(("state", state));
    }

    let request = http.get(cli.url("/oauth/authorize")).query(&query);
    let response = cli.authed(request).send().await?;
    let status = response.status();
    if cli.verbose {
        eprintln!("{} {}", status, response.url());
    }

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;
    check_status(status, body)?;

    let location =
        location.ok_or_else(|| AppError::General("authorization response has no Location".to_string()))?;
    let token = token_from_location(&location)?;
    println!("{}", token);
    Ok(())
}

fn token_from_location(location: &str) -> Result<String, AppError> {
    let location = Url::parse(location)
        .map_err(|err| AppError::General(format!("invalid redirect location {}: {}", location, err)))?;

    location
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| AppError::General("redirect location carries no token".to_string()))
}
