use print_agent::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env is optional)
    dotenvy::dotenv().ok();

    // 2. Configuration and logging
    let config = Config::from_env();
    init_logger_with_file(Some(config.log_level.as_str()), config.log_dir.as_deref());

    print_banner();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "🖨️ Print agent starting...");

    // 3. Serve until Ctrl-C
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
