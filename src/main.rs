use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terabox_link::{config::Config, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 只留 JSON）
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terabox_link=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 用法：terabox-link <share_url> [config_path]
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        return Err(anyhow!(
            "用法: {} <share_url> [config_path]",
            args.first().map(|s| s.as_str()).unwrap_or("terabox-link")
        ));
    }

    let share_url = args[1].clone();
    let config_path = std::env::var("CONFIG_PATH")
        .ok()
        .or_else(|| args.get(2).cloned())
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    let state = AppState::new(config)?;

    let mut rng = rand::thread_rng();
    let result = state
        .extractor
        .extract(&state.fetcher, &share_url, &mut rng)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
