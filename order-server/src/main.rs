use order_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(config.log_level.as_str()), None);

    print_banner();
    tracing::info!("Lonchera order server starting...");

    // 2. Initialize server state (work dir, database, services)
    let state = ServerState::initialize(&config).await;

    // 3. Run HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        anyhow::bail!("server exited with error: {e}");
    }

    Ok(())
}
