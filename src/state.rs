//! 应用状态：配置、解析器与 HTTP client

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Config;
use crate::terabox::{Extractor, HttpFetcher};

pub struct AppState {
    pub config: Config,
    pub extractor: Extractor,
    pub fetcher: HttpFetcher,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // 不保存 Cookie，每次请求都是独立的
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.terabox.http_timeout_secs,
            ))
            .build()
            .context("创建 HTTP Client 失败")?;

        let extractor = Extractor::new(config.terabox.clone())
            .with_context(|| format!("无效的 data_variable: {}", config.terabox.data_variable))?;

        Ok(Self {
            config,
            extractor,
            fetcher: HttpFetcher::new(client),
        })
    }
}
