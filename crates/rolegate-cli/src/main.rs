//! `rolegate` CLI — command-line client for the first-admin bootstrap endpoint.
//!
//! A standalone HTTP client. No internal crate dependencies; it talks to the
//! server exclusively over the public endpoint.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{Value, json};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BANNER_SMALL: &str = "⟐ rolegate";

/// Path of the bootstrap endpoint.
const ENDPOINT: &str = "/v1/assign-first-admin";

// ── CLI structure ────────────────────────────────────────────────────

/// rolegate — first-admin bootstrap client.
#[derive(Parser)]
#[command(
    name = "rolegate",
    version,
    about = "rolegate CLI — check admin signup status and grant the admin role",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         ROLEGATE_ADDR    Server address (default: http://127.0.0.1:8300)\n  \
         ROLEGATE_TOKEN   Bearer token issued by the identity provider\n\n\
         {DIM}Examples:{RESET}\n  \
         rolegate status\n  \
         rolegate assign --user-id 3f6c2a9e-5b1d-4c8f-9a2e-7d0b1e4f6a13"
    ),
)]
struct Cli {
    /// rolegate server address.
    #[arg(long, env = "ROLEGATE_ADDR", default_value = "http://127.0.0.1:8300")]
    addr: String,

    /// Bearer token for the calling user.
    #[arg(long, env = "ROLEGATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether first-admin signup is open.
    Status,
    /// Grant the admin role to a user.
    Assign {
        /// Subject identifier of the user to promote.
        #[arg(long)]
        user_id: String,
    },
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(title: &str) {
    println!("{BOLD}{CYAN}{BANNER_SMALL} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

// ── HTTP client ──────────────────────────────────────────────────────

/// Error body returned by the server on every non-200 response.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

struct Client {
    http: reqwest::Client,
    addr: String,
    token: Option<String>,
}

impl Client {
    fn new(addr: String, token: Option<String>) -> Self {
        let http = reqwest::Client::new();
        Self { http, addr, token }
    }

    fn url(&self) -> String {
        format!("{}{ENDPOINT}", self.addr.trim_end_matches('/'))
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("no token provided — set ROLEGATE_TOKEN or use --token"))
    }

    async fn post(&self, body: &Value) -> Result<Value> {
        let token = self.bearer()?;
        let resp = self
            .http
            .post(self.url())
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }

    async fn post_no_auth(&self, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url())
            .json(body)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.context("failed to read response body")?;
    if status != reqwest::StatusCode::OK {
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => bail!("server returned {status}: {}", err.error),
            Err(_) => bail!("server returned {status}: {body}"),
        }
    }
    serde_json::from_str(&body).context("failed to parse response JSON")
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = Client::new(cli.addr, cli.token);

    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &Client, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status => {
            cmd_status(client).await;
            Ok(())
        }
        Commands::Assign { user_id } => cmd_assign(client, &user_id).await,
    }
}

/// Any failure to learn the status is reported as "not available".
async fn cmd_status(client: &Client) {
    println!();
    let result = client
        .post_no_auth(&json!({ "check_signup_enabled": true }))
        .await
        .and_then(|resp| {
            resp.get("signup_enabled")
                .and_then(Value::as_bool)
                .context("response did not include signup_enabled")
        });

    header("Admin Signup");
    match result {
        Ok(true) => {
            kv_line("Signup", &format!("{GREEN}available{RESET}"));
            println!();
            println!("  {DIM}No admin exists yet. Sign in and run:{RESET}");
            println!("  {DIM}  rolegate assign --user-id <your user id>{RESET}");
        }
        Ok(false) => {
            kv_line("Signup", &format!("{RED}not available{RESET}"));
            println!();
            println!("  {DIM}An admin already exists. Ask them to grant you the role.{RESET}");
        }
        Err(e) => {
            kv_line("Signup", &format!("{RED}not available{RESET}"));
            println!();
            warning(&format!("could not check signup status: {e:#}"));
        }
    }
    println!();
}

async fn cmd_assign(client: &Client, user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        bail!("--user-id must not be empty");
    }

    client.post(&json!({ "user_id": user_id })).await?;

    println!();
    success(&format!("Admin role granted to {BOLD}{user_id}{RESET}"));
    println!();
    Ok(())
}
