use std::sync::Arc;

use fitplan::config::AppConfig;
use fitplan::generator::PlanGenerator;
use fitplan::llm::{OpenAiModel, PlanModel};
use fitplan::mailer::{PlanDispatcher, SmtpMailer};
use fitplan::proxy::{ProxyState, proxy_routes};
use fitplan::routes::{AppState, plan_routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Refuse to start without credentials
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  required: OPENAI_API_KEY, SENDER_EMAIL, SENDER_PASSWORD");
        std::process::exit(1);
    });

    eprintln!("fitplan v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model.model);
    eprintln!("   SMTP: {}:{}", config.smtp.host, config.smtp.port);
    eprintln!("   Sender: {}", config.smtp.sender);
    eprintln!("   Listening: http://0.0.0.0:{}\n", config.port);

    let model: Arc<dyn PlanModel> = Arc::new(OpenAiModel::new(config.model.clone())?);

    let state = AppState {
        generator: Arc::new(PlanGenerator::new(Arc::clone(&model))),
        dispatcher: Arc::new(PlanDispatcher::new(
            config.smtp.sender.clone(),
            Arc::new(SmtpMailer::new(config.smtp.clone())),
        )),
    };

    let proxy_state = ProxyState {
        model,
        http: reqwest::Client::new(),
        store_api_url: config.store_api_url.clone(),
    };

    let app = plan_routes(state).merge(proxy_routes(proxy_state));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "fitplan server started");
    axum::serve(listener, app).await?;

    Ok(())
}
