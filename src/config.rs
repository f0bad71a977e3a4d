//! 配置文件加载

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)] // 没有 [web] 就用默认值
    pub web: WebConfig,
    #[serde(default)]
    pub terabox: TeraboxConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// TeraBox 页面结构相关的常量
///
/// 域名白名单与页面内嵌 JSON 的变量名随官方页面改版而变化，
/// 放在配置里，解析逻辑不需要跟着改。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeraboxConfig {
    /// 可接受的域名片段（去掉 `www.` 后做子串匹配）
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
    /// 页面中 `window.<data_variable> = {...};` 的变量名
    #[serde(default = "default_data_variable")]
    pub data_variable: String,
    /// 短链使用的域名
    #[serde(default = "default_canonical_host")]
    pub canonical_host: String,
    #[serde(default = "default_download_host")]
    pub download_host: String,
    #[serde(default = "default_thumbnail_host")]
    pub thumbnail_host: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for TeraboxConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            data_variable: default_data_variable(),
            canonical_host: default_canonical_host(),
            download_host: default_download_host(),
            thumbnail_host: default_thumbnail_host(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    // PORT 环境变量优先
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5200)
}

fn default_allowed_hosts() -> Vec<String> {
    [
        "terabox.com",
        "1024terabox.com",
        "teraboxapp.com",
        "terabox.app",
        "terabox.fun",
        "1024tera.com",
        "teraboxlink.com",
        "terasharelink.com",
        "freeterabox.com",
        "4funbox.com",
        "mirrobox.com",
        "nephobox.com",
        "momerybox.com",
        "tibibox.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_data_variable() -> String {
    "yunData".to_string()
}

fn default_canonical_host() -> String {
    "1024terabox.com".to_string()
}

fn default_download_host() -> String {
    "d.terabox.com".to_string()
}

fn default_thumbnail_host() -> String {
    "data.terabox.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Config {
    /// 读取 TOML 配置；文件不存在时使用默认值
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path))?;
        Ok(config)
    }

    pub fn browser_ua() -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    }
}
