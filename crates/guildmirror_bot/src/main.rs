use guildmirror_bot::{MirrorBot, MirrorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let token = MirrorConfig::token()?;
    let config = MirrorConfig::load()?;

    let mut bot = MirrorBot::new(token, config).await?;
    bot.start().await?;
    Ok(())
}
