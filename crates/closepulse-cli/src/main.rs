//! ClosePulse terminal front end
//!
//! Drives the session store and the call review dashboard from the command
//! line. Sessions persist in a per-user data directory when signing in with
//! `--remember`, so later invocations pick them up.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use closepulse_core::config::RouteConfig;
use closepulse_core::{ActionOutcome, CallId, Config, SessionState};
use closepulse_dashboard::{DashboardView, GateDecision, NavigationPlan, Navigator, ViewGate};
use closepulse_session::{FileStore, SessionHandle, SessionStore};
use render::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Exit code when a dashboard command is turned away by the gate
const EXIT_REDIRECTED: u8 = 2;

/// Command line interface for ClosePulse
#[derive(Parser)]
#[command(
    name = "closepulse",
    version = env!("CARGO_PKG_VERSION"),
    about = "Review recorded sales calls from the terminal",
    long_about = "Sign in, browse and search recorded sales calls, inspect per-call analysis and view the pattern summary."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(
            short,
            long,
            env = "CLOSEPULSE_LOGIN_PASSWORD",
            hide_env_values = true
        )]
        password: String,

        /// Stay signed in across invocations
        #[arg(short, long)]
        remember: bool,
    },

    /// Sign out and forget the remembered session
    Logout,

    /// Show the current session
    Status,

    /// Request password reset instructions
    ForgotPassword {
        /// Account email
        #[arg(short, long)]
        email: String,
    },

    /// List calls, optionally filtered by customer, agent or topic
    Calls {
        /// Case-insensitive search text
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Show the analysis of one call
    Show {
        /// Call id
        #[arg(value_name = "ID")]
        id: CallId,
    },

    /// Show the pattern summary
    Patterns {
        /// Derive patterns from the calls instead of the authored summary
        #[arg(long)]
        live: bool,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration
        #[arg(short, long)]
        validate: bool,
    },
}

/// Prints navigation on stderr so stdout stays machine-readable
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigating");
        eprintln!("-> {route}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    let _log_guard =
        closepulse_core::init_logging(&config.logging).context("Failed to initialize logging")?;

    debug!(version = env!("CARGO_PKG_VERSION"), "ClosePulse starting");

    let format = cli.format;
    if let Commands::Config { show, validate } = cli.command {
        return handle_config_command(&config, show, validate);
    }

    let store = open_session(&config).await;
    match cli.command {
        Commands::Login {
            email,
            password,
            remember,
        } => login(&store, &config.routes, &email, &password, remember, format).await,
        Commands::Logout => logout(&store, &config.routes, format).await,
        Commands::Status => {
            let snapshot = store.snapshot();
            match format {
                OutputFormat::Table => println!("{}", render::session(&snapshot)),
                OutputFormat::Json => println!("{}", render::json(&snapshot)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::ForgotPassword { email } => {
            let outcome = store.forgot_password(&email).await;
            print_outcome(&outcome, format)
        }
        Commands::Calls { query } => {
            if let Some(code) = enter_dashboard(&store, &config.routes) {
                return Ok(code);
            }
            let mut view = DashboardView::from_config(&config.dataset)?;
            view.set_query(query);
            let visible = view.visible();
            match format {
                OutputFormat::Table => print!(
                    "{}",
                    render::call_table(&visible, |call| view.is_selected(call.id))
                ),
                OutputFormat::Json => println!("{}", render::json(&visible)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { id } => {
            if let Some(code) = enter_dashboard(&store, &config.routes) {
                return Ok(code);
            }
            let mut view = DashboardView::from_config(&config.dataset)?;
            view.select_id(id)?;
            let detail = view
                .detail()
                .with_context(|| format!("call {id} has no detail"))?;
            match format {
                OutputFormat::Table => print!("{}", render::call_detail(&detail)),
                OutputFormat::Json => println!("{}", render::json(&detail)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Patterns { live } => {
            if let Some(code) = enter_dashboard(&store, &config.routes) {
                return Ok(code);
            }
            let mut dataset = config.dataset.clone();
            dataset.live_patterns |= live;
            let groups = DashboardView::from_config(&dataset)?.patterns();
            match format {
                OutputFormat::Table => print!("{}", render::patterns(&groups)),
                OutputFormat::Json => println!("{}", render::json(&groups)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        // Handled before the session is opened
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Load configuration from file or environment
///
/// # Errors
///
/// Returns error if the configuration file cannot be read, parsed or validated
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_path {
        Config::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    } else {
        Config::load().context("Failed to load configuration")
    }
}

/// Directory holding the remembered session
fn store_directory(config: &Config) -> PathBuf {
    config
        .session
        .store_dir
        .clone()
        .or_else(|| {
            directories::ProjectDirs::from("com", "ClosePulse", "closepulse")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from(".closepulse"))
}

/// Build the session store and restore any remembered session
async fn open_session(config: &Config) -> SessionHandle {
    let storage = FileStore::new(store_directory(config));
    debug!(store = %storage.directory().display(), "Opening session store");
    let store = SessionStore::from_config(config, Arc::new(storage)).into_handle();
    let snapshot = store.restore().await;
    if snapshot.state.is_settled() {
        debug!(state = %snapshot.state, "Session restored");
    } else {
        warn!(state = %snapshot.state, "Session not settled after restore");
    }
    store
}

/// Run the gate for a dashboard command; `Some` means stop with that code
fn enter_dashboard(store: &SessionStore, routes: &RouteConfig) -> Option<ExitCode> {
    let mut gate = ViewGate::from_routes(routes);
    gate.mount();
    let decision = gate.decide(&store.snapshot());
    if decision.renders_dashboard() {
        return None;
    }
    if let GateDecision::Redirect(route) = decision {
        eprintln!("Not signed in. Run `closepulse login --remember` first.");
        TerminalNavigator.navigate(&route);
        Some(ExitCode::from(EXIT_REDIRECTED))
    } else {
        Some(ExitCode::FAILURE)
    }
}

async fn follow_navigation(previous: SessionState, next: SessionState, routes: &RouteConfig) {
    if let Some(plan) = NavigationPlan::after_transition(previous, next, routes) {
        plan.follow(&TerminalNavigator).await;
    }
}

fn print_outcome(outcome: &ActionOutcome, format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Table => println!("{}", outcome.message),
        OutputFormat::Json => println!("{}", render::json(outcome)?),
    }
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn login(
    store: &SessionStore,
    routes: &RouteConfig,
    email: &str,
    password: &str,
    remember: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let previous = store.state();
    let outcome = store.login(email, password, remember).await;
    let code = print_outcome(&outcome, format)?;
    if outcome.success {
        if !remember && format == OutputFormat::Table {
            println!("Session not remembered; pass --remember to stay signed in.");
        }
        follow_navigation(previous, store.state(), routes).await;
    }
    Ok(code)
}

async fn logout(store: &SessionStore, routes: &RouteConfig, format: OutputFormat) -> Result<ExitCode> {
    let previous = store.state();
    store.logout().await;
    match format {
        OutputFormat::Table => println!("Signed out"),
        OutputFormat::Json => println!("{}", render::json(&store.snapshot())?),
    }
    follow_navigation(previous, store.state(), routes).await;
    Ok(ExitCode::SUCCESS)
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration cannot be serialized or is invalid
fn handle_config_command(config: &Config, show: bool, validate: bool) -> Result<ExitCode> {
    if validate {
        config.validate()?;
        for path in [&config.dataset.calls_path, &config.dataset.patterns_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                warn!("Data file does not exist: {}", path.display());
            }
        }
        println!("Configuration is valid");
    }

    if show {
        let mut shown = config.clone();
        shown.auth.password = "********".to_string();
        let config_toml =
            toml::to_string_pretty(&shown).context("Failed to serialize configuration")?;
        println!("{config_toml}");
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "closepulse",
            "--format",
            "json",
            "login",
            "--email",
            "demo@closepulse.com",
            "--password",
            "password",
            "--remember",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Login { ref email, remember: true, .. } if email == "demo@closepulse.com"
        ));
    }

    #[test]
    fn test_parse_show_id() {
        let cli = Cli::try_parse_from(["closepulse", "show", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { id: CallId(3) }));
        assert!(Cli::try_parse_from(["closepulse", "show", "three"]).is_err());
    }

    #[test]
    fn test_calls_query_defaults_to_match_all() {
        let cli = Cli::try_parse_from(["closepulse", "calls"]).unwrap();
        assert!(matches!(cli.command, Commands::Calls { ref query } if query.is_empty()));
    }

    #[test]
    fn test_store_directory_override() {
        let mut config = Config::default();
        config.session.store_dir = Some(PathBuf::from("/tmp/closepulse-test"));
        assert_eq!(
            store_directory(&config),
            PathBuf::from("/tmp/closepulse-test")
        );
    }
}
