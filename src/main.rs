use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use searchkaro_admin::auth::SIGNUP_FALLBACK_MESSAGE;
use searchkaro_admin::config::{ConfigError, DEFAULT_API_URL, DEFAULT_COOKIE_JAR};
use searchkaro_admin::recovery::{PasswordRecovery, RecoveryError, RecoveryStep};
use searchkaro_admin::resources::{Category, LegalPolicy, Location, PageRequest, Rating, RecordId, Report, Resource};
use searchkaro_admin::{
    ApiClient, ApiError, AuthError, AuthGateway, ClientConfig, CountdownOutcome, Credentials, DEFAULT_COUNTDOWN_SECS,
    FileCookieStore, GuardDecision, LogoutCountdown, Route, Session, SignupRequest,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cookie jar unavailable: {0}")]
    CookieJar(#[from] std::io::Error),
    #[error("{}", .0.user_message("Request failed"))]
    Api(#[from] ApiError),
    #[error("{}", .0.message())]
    Auth(#[from] AuthError),
    #[error("{}", .0.message())]
    Recovery(#[from] RecoveryError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("{0} requires a session; log in first")]
    LoginRequired(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "searchkaro", about = "Searchkaro admin dashboard client")]
struct Cli {
    #[arg(long, env = "SEARCHKARO_API_URL", default_value = DEFAULT_API_URL)]
    base_url: String,

    #[arg(long, env = "SEARCHKARO_COOKIE_JAR", default_value = DEFAULT_COOKIE_JAR)]
    cookie_jar: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SEARCHKARO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout {
        /// Seconds to wait before signing out; Ctrl-C cancels. A bare flag
        /// uses the default prompt length.
        #[arg(long, num_args = 0..=1)]
        countdown: Option<Option<u32>>,
    },
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SEARCHKARO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the restored session.
    Status,
    /// Run the route guard for a dashboard path.
    Open { path: String },
    Search { query: String },
    Dashboard,
    Categories(ResourceCommand),
    Locations(ResourceCommand),
    Ratings(ResourceCommand),
    LegalPolicies(ResourceCommand),
    Reports(ResourceCommand),
    Password(PasswordCommand),
}

#[derive(Args, Debug)]
struct ResourceCommand {
    #[command(subcommand)]
    command: ResourceSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResourceSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    All,
    Add {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct PasswordCommand {
    #[command(subcommand)]
    command: PasswordSubcommand,
}

#[derive(Subcommand, Debug)]
enum PasswordSubcommand {
    /// Email a one-time code.
    Request {
        #[arg(long)]
        email: String,
    },
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    Reset {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long, env = "SEARCHKARO_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli.base_url, cli.cookie_jar)?;
    let store = Arc::new(FileCookieStore::open(&config.cookie_jar)?);
    let api = ApiClient::new(&config, store)?;
    let gateway = Arc::new(AuthGateway::new(api));
    gateway.restore();

    match cli.command {
        Command::Login { email, password } => {
            let user = gateway.login(&Credentials::new(email, password)).await?;
            print_json(&json!({ "user": user, "next": Route::Dashboard.path() }))
        }
        Command::Logout { countdown } => run_logout(gateway, countdown_secs(countdown)).await,
        Command::Signup { name, email, password } => {
            let message = gateway
                .signup(&SignupRequest { name, email, password })
                .await
                .map_err(|error| CliError::Rejected(error.user_message(SIGNUP_FALLBACK_MESSAGE)))?;
            print_json(&json!({ "message": message, "next": Route::Login.path() }))
        }
        Command::Status => print_json(&status_json(&gateway.session())),
        Command::Open { path } => {
            let route = Route::from_path(&path);
            let decision = match gateway.navigate(route) {
                GuardDecision::Pending => json!({ "decision": "pending" }),
                GuardDecision::Redirect(to) => json!({ "decision": "redirect", "to": to.path() }),
                GuardDecision::Render(route) => json!({ "decision": "render", "route": route.path() }),
            };
            print_json(&decision)
        }
        Command::Search { query } => {
            let api = require(&gateway, Route::Search)?;
            print_json(&api.search(&query).await?)
        }
        Command::Dashboard => {
            let api = require(&gateway, Route::Dashboard)?;
            print_json(&api.dashboard().await?)
        }
        Command::Categories(cmd) => run_resource::<Category>(&gateway, Route::Categories, cmd).await,
        Command::Locations(cmd) => run_resource::<Location>(&gateway, Route::Location, cmd).await,
        Command::Ratings(cmd) => run_resource::<Rating>(&gateway, Route::Rating, cmd).await,
        Command::LegalPolicies(cmd) => run_resource::<LegalPolicy>(&gateway, Route::LegalPolicy, cmd).await,
        Command::Reports(cmd) => run_resource::<Report>(&gateway, Route::Reports, cmd).await,
        Command::Password(cmd) => run_password(gateway.api().clone(), cmd).await,
    }
}

/// Environment config with the `--base-url`/`--cookie-jar` flags applied.
fn build_config(base_url: &str, cookie_jar: PathBuf) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::from_env()?.with_base_url(base_url)?;
    config.cookie_jar = cookie_jar;
    Ok(config)
}

fn countdown_secs(flag: Option<Option<u32>>) -> Option<u32> {
    flag.map(|secs| secs.unwrap_or(DEFAULT_COUNTDOWN_SECS))
}

/// Session summary for `status`. The token itself is never printed.
fn status_json(session: &Session) -> Value {
    json!({
        "authenticated": session.is_authenticated(),
        "loading": session.is_loading(),
        "user": session.user(),
    })
}

/// Run the guard for `route`; only a rendered screen may call the backend.
fn require(gateway: &AuthGateway, route: Route) -> Result<&ApiClient, CliError> {
    match gateway.navigate(route) {
        GuardDecision::Render(_) => Ok(gateway.api()),
        GuardDecision::Pending | GuardDecision::Redirect(_) => Err(CliError::LoginRequired(route.path())),
    }
}

async fn run_logout(gateway: Arc<AuthGateway>, countdown: Option<u32>) -> Result<(), CliError> {
    let Some(seconds) = countdown else {
        gateway.logout();
        return print_json(&json!({ "loggedOut": true, "next": Route::Login.path() }));
    };

    let hook = gateway.clone();
    let mut countdown = LogoutCountdown::start(seconds, Duration::from_secs(1), move || hook.logout());
    let mut remaining = countdown.subscribe();
    eprintln!("logging out in {seconds}s (Ctrl-C to stay signed in)");

    let outcome = loop {
        tokio::select! {
            changed = remaining.changed() => {
                if changed.is_err() {
                    break countdown.wait().await;
                }
                let left = *remaining.borrow_and_update();
                if left > 0 {
                    eprintln!("{left}...");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                countdown.cancel();
                break countdown.wait().await;
            }
        }
    };

    let logged_out = outcome == CountdownOutcome::Expired;
    let next = if logged_out { Route::Login } else { Route::Dashboard };
    print_json(&json!({ "loggedOut": logged_out, "next": next.path() }))
}

async fn run_resource<T: Resource>(gateway: &AuthGateway, route: Route, cmd: ResourceCommand) -> Result<(), CliError> {
    let api = require(gateway, route)?;
    match cmd.command {
        ResourceSubcommand::List { page, limit } => print_json(&api.list::<T>(PageRequest::new(page, limit)).await?),
        ResourceSubcommand::All => print_json(&api.list_all::<T>().await?),
        ResourceSubcommand::Add { data } => {
            let record = serde_json::from_str::<T>(&data)?;
            print_json(&api.create(&record).await?)
        }
        ResourceSubcommand::Update { id, data } => {
            let record = serde_json::from_str::<T>(&data)?;
            print_json(&api.update(&RecordId::from(id.as_str()), &record).await?)
        }
        ResourceSubcommand::Delete { id } => print_json(&api.delete::<T>(&RecordId::from(id.as_str())).await?),
    }
}

async fn run_password(api: ApiClient, cmd: PasswordCommand) -> Result<(), CliError> {
    let (message, step) = match cmd.command {
        PasswordSubcommand::Request { email } => {
            let mut flow = PasswordRecovery::new(api);
            (flow.request_otp(&email).await?, flow.step())
        }
        PasswordSubcommand::Verify { email, otp } => {
            let mut flow = PasswordRecovery::resume(api, RecoveryStep::VerifyOtp, &email, "");
            (flow.verify_otp(&otp).await?, flow.step())
        }
        PasswordSubcommand::Reset { email, otp, new_password } => {
            let mut flow = PasswordRecovery::resume(api, RecoveryStep::ResetPassword, &email, &otp);
            (flow.reset_password(&new_password).await?, flow.step())
        }
    };
    let next = if step == RecoveryStep::Complete { Some(Route::Login.path()) } else { None };
    print_json(&json!({ "message": message, "step": format!("{step:?}"), "next": next }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let value: Value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
