use mock_server::MockOptions;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("ECOMAIL_API_KEY").unwrap_or_else(|_| "test-key".to_string());
    let mut options = MockOptions::new(api_key);
    if let Some(limit) = std::env::var("RATE_LIMIT").ok().and_then(|v| v.parse().ok()) {
        options = options.with_rate_limit(limit);
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run(listener, options).await
}
