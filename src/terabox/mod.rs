//! TeraBox 分享链接解析模块
//!
//! 流程：校验链接 -> 抓取页面 -> 提取标识符 / 解析内嵌数据 -> 拼接直链 -> 生成短链。
//! 任一步失败立即返回错误结果。

pub mod link;
pub mod parser;
pub mod share;
pub mod types;

use rand::Rng;
use tracing::{info, warn};

use crate::config::TeraboxConfig;
use crate::error::ExtractError;

// 导出常用函数
pub use link::short_link;
pub use parser::{extract_identifier, extract_share_token, normalize_url};
pub use share::{format_size, HttpFetcher, PageFetcher, PageScraper};
pub use types::{ExtractionResult, FileInfo, FileRecord, SignContext, Thumbnails};

/// 解析器：配置 + 按配置编译好的页面定位器
#[derive(Debug, Clone)]
pub struct Extractor {
    config: TeraboxConfig,
    scraper: PageScraper,
}

impl Extractor {
    pub fn new(config: TeraboxConfig) -> Result<Self, regex::Error> {
        let scraper = PageScraper::new(&config)?;
        Ok(Self { config, scraper })
    }

    /// 解析一个分享链接
    pub async fn extract<F, R>(&self, fetcher: &F, share_url: &str, rng: &mut R) -> ExtractionResult
    where
        F: PageFetcher + ?Sized,
        R: Rng + ?Sized,
    {
        let result = self.run(fetcher, share_url, rng).await;
        if let Err(e) = &result {
            warn!("❌ 解析失败: {} ({})", e, share_url);
        }
        result.into()
    }

    async fn run<F, R>(
        &self,
        fetcher: &F,
        share_url: &str,
        rng: &mut R,
    ) -> Result<(FileInfo, String), ExtractError>
    where
        F: PageFetcher + ?Sized,
        R: Rng + ?Sized,
    {
        info!("📥 解析分享链接: {}", share_url);

        let url = normalize_url(share_url, &self.config.allowed_hosts)?;
        let html = fetcher.fetch(&url).await?;

        let identifier = extract_identifier(&url, Some(&html))?;
        info!("🔑 标识符: {}", identifier);

        let info = self.scraper.file_info(&html, &self.config, rng)?;
        let short = short_link(&self.config, &identifier);

        info!("✅ 解析成功: {} ({})", info.title, info.size);
        Ok((info, short))
    }
}
