use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use invoice_monitor::config::{AppConfig, MonitorConfig, SecretChain};
use invoice_monitor::domain::health::init_start_time;
use invoice_monitor::domain::order::{SeaOrmConnector, StoreConnector};
use invoice_monitor::monitoring::formatter::format_test_alert;
use invoice_monitor::monitoring::{AlertChannel, Monitor, ParseMode, TelegramAlert};
use invoice_monitor::notification::{EventNotifier, NotifyOutcome};
use invoice_monitor::shutdown::shutdown_signal;
use invoice_monitor::utils::logging::init_logging;
use invoice_monitor::{app, AppState};

#[derive(Parser)]
#[command(
    name = "invoice-monitor",
    about = "Invoicing system monitoring and build/invoice Telegram notifications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one monitoring pass and print the summary as JSON
    Check,

    /// Handle one base64 encoded build/invoice event
    Notify {
        /// base64(JSON) payload, as found in a Pub/Sub message
        data: String,
    },

    /// Print the test alert
    TestAlert {
        /// Also send it to Telegram
        #[arg(long)]
        send: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화 (guard는 main 종료까지 유지)
    let _guard = init_logging();

    let cli = Cli::parse();

    // 3. 설정 로드
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let secrets = Arc::new(SecretChain::from_app_config(&config));

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, secrets, port).await,
        Command::Check => check(&config, &secrets).await,
        Command::Notify { data } => notify(&config, &secrets, &data).await,
        Command::TestAlert { send } => test_alert(&config, &secrets, send).await,
    }
}

async fn serve(config: AppConfig, secrets: Arc<SecretChain>, port: Option<u16>) -> ExitCode {
    init_start_time();

    let port = port.unwrap_or(config.server_port);
    let connector: Arc<dyn StoreConnector> = Arc::new(SeaOrmConnector);
    let router = app(AppState::new(config, secrets, connector));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on {}", addr);
    info!("Swagger UI: http://localhost:{}/swagger-ui", port);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    info!("Server shut down gracefully");
    ExitCode::SUCCESS
}

async fn check(config: &AppConfig, secrets: &SecretChain) -> ExitCode {
    let monitor_config = MonitorConfig::resolve(secrets, config).await;
    let summary = Monitor::from_config(&monitor_config, Arc::new(SeaOrmConnector))
        .run()
        .await;

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => error!(error = %e, "Failed to serialize summary"),
    }

    if summary.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn notify(config: &AppConfig, secrets: &SecretChain, data: &str) -> ExitCode {
    let monitor_config = MonitorConfig::resolve(secrets, config).await;
    let outcome = EventNotifier::from_config(&monitor_config)
        .handle(data)
        .await;

    println!("{}", serde_json::json!({ "outcome": outcome }));

    match outcome {
        NotifyOutcome::Failed | NotifyOutcome::NotConfigured => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

async fn test_alert(config: &AppConfig, secrets: &SecretChain, send: bool) -> ExitCode {
    let message = format_test_alert(&config.source_label, Utc::now());
    println!("{}", message);

    if !send {
        return ExitCode::SUCCESS;
    }

    let monitor_config = MonitorConfig::resolve(secrets, config).await;
    match TelegramAlert::from_config(&monitor_config)
        .send(&message, ParseMode::Html)
        .await
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Failed to send test alert");
            ExitCode::FAILURE
        }
    }
}
