use mock_server::{MockConfig, MockState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = MockConfig::default();
    if let Some(service_id) = std::env::var("UCALLER_MOCK_SERVICE_ID")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.service_id = service_id;
    }
    if let Ok(key) = std::env::var("UCALLER_MOCK_KEY") {
        config.key = key;
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, service_id = config.service_id, "mock uCaller listening");
    mock_server::run_with(listener, MockState::new(config)).await
}
