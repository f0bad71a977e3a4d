//! 分享页面抓取与内嵌数据解析

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use reqwest::Client;
use tracing::{debug, info};

use super::link;
use super::types::{FileInfo, PageData, SignContext};
use crate::config::{Config, TeraboxConfig};
use crate::error::ExtractError;

/// 抓取页面文本
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}

/// 基于 reqwest 的抓取实现：单次 GET，无重试
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// 模拟桌面浏览器的请求头，并禁用缓存
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(Config::browser_ua()));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        info!("🌐 访问分享页面: {}", url);

        let resp = self
            .client
            .get(url)
            .headers(browser_headers())
            .send()
            .await
            .map_err(|e| ExtractError::FetchFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractError::FetchFailed(format!("HTTP {}", status)));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| ExtractError::FetchFailed(e.to_string()))?;
        debug!("📄 页面长度: {} 字节", html.len());
        Ok(html)
    }
}

/// 页面内嵌数据的定位器，正则按配置中的变量名编译一次
#[derive(Debug, Clone)]
pub struct PageScraper {
    data_re: Regex,
}

impl PageScraper {
    pub fn new(config: &TeraboxConfig) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"window\.{}\s*=\s*",
            regex::escape(&config.data_variable)
        );
        Ok(Self {
            data_re: Regex::new(&pattern)?,
        })
    }

    /// 找到 `window.<var> = {...};` 并解码为 `PageData`
    ///
    /// 正则只定位赋值语句的开头，JSON 的结束位置交给 serde_json 判断，
    /// 字符串里出现 `};` 也不会截断。
    pub fn page_data(&self, html: &str) -> Result<PageData, ExtractError> {
        let start = self
            .data_re
            .find(html)
            .ok_or(ExtractError::PageDataNotFound)?
            .end();

        serde_json::Deserializer::from_str(&html[start..])
            .into_iter::<PageData>()
            .next()
            .ok_or(ExtractError::PageDataNotFound)?
            .map_err(|e| ExtractError::PageDataInvalid(e.to_string()))
    }

    /// 解析出第一个文件的信息，并生成直链与缩略图
    pub fn file_info<R: Rng + ?Sized>(
        &self,
        html: &str,
        config: &TeraboxConfig,
        rng: &mut R,
    ) -> Result<FileInfo, ExtractError> {
        let data = self.page_data(html)?;
        let ctx = SignContext {
            server: data.server,
            sign: data.sign,
            timestamp: data.timestamp,
        };
        // 只支持单文件分享，取第一个
        let record = data
            .file_list
            .into_iter()
            .next()
            .ok_or(ExtractError::EmptyFileList)?;

        debug!(
            "✅ 文件: {} (fs_id={}, category={}, server={})",
            record.server_filename, record.fs_id, record.category, ctx.server
        );

        let direct_link = link::direct_link(config, &record, &ctx, rng);
        let thumbnails = link::thumbnails(config, &record, &ctx, rng);

        Ok(FileInfo {
            title: record.server_filename,
            size: format_size(record.size),
            direct_link,
            thumbnails,
        })
    }
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 字节数格式化，保留两位小数并去掉末尾的 0：`1536` -> `1.5 KB`
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut i = 0;
    while i < SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(i as u32 + 1) {
        i += 1;
    }

    let value = bytes as f64 / 1024f64.powi(i as i32);
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[i])
}
