//! 链接解析：域名校验与标识符提取

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use crate::error::ExtractError;

/// 校验分享链接
///
/// 域名（去掉开头的 `www.`）必须包含白名单中的某个片段。
/// 合法链接原样返回；短链跳转不做解析。
pub fn normalize_url(raw: &str, allowed_hosts: &[String]) -> Result<String, ExtractError> {
    let parsed = Url::parse(raw.trim()).map_err(|_| ExtractError::InvalidUrl)?;
    let host = parsed
        .host_str()
        .ok_or(ExtractError::InvalidUrl)?
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let allowed = allowed_hosts
        .iter()
        .filter(|h| !h.is_empty())
        .any(|h| host.contains(h.to_ascii_lowercase().as_str()));

    if !allowed {
        debug!("域名不在白名单中: {}", host);
        return Err(ExtractError::InvalidUrl);
    }

    Ok(raw.to_string())
}

/// 从分享链接中提取分享码
///
/// 支持：
/// - https://terabox.com/s/1xxxx
/// - https://terabox.com/sharing/link?surl=xxxx
pub fn extract_share_token(share_url: &str) -> Option<String> {
    static PATH_RE: OnceLock<Regex> = OnceLock::new();
    static QUERY_RE: OnceLock<Regex> = OnceLock::new();

    let path_re = PATH_RE.get_or_init(|| Regex::new(r"/s/([\w-]+)").unwrap());
    if let Some(c) = path_re.captures(share_url) {
        return Some(c[1].to_string());
    }

    let query_re = QUERY_RE.get_or_init(|| Regex::new(r"[?&]surl=([\w-]+)").unwrap());
    query_re.captures(share_url).map(|c| c[1].to_string())
}

/// 依次尝试：链接中的分享码、页面中的 `"fs_id":<数字>`、页面中的 `"shareid":<数字>`
pub fn extract_identifier(url: &str, page: Option<&str>) -> Result<String, ExtractError> {
    static FS_ID_RE: OnceLock<Regex> = OnceLock::new();
    static SHAREID_RE: OnceLock<Regex> = OnceLock::new();

    if let Some(token) = extract_share_token(url) {
        return Ok(token);
    }

    let Some(page) = page else {
        return Err(ExtractError::IdentifierNotFound);
    };

    let fs_id_re = FS_ID_RE.get_or_init(|| Regex::new(r#""fs_id"\s*:\s*(\d+)"#).unwrap());
    if let Some(c) = fs_id_re.captures(page) {
        return Ok(c[1].to_string());
    }

    let shareid_re = SHAREID_RE.get_or_init(|| Regex::new(r#""shareid"\s*:\s*(\d+)"#).unwrap());
    shareid_re
        .captures(page)
        .map(|c| c[1].to_string())
        .ok_or(ExtractError::IdentifierNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeraboxConfig;

    fn hosts() -> Vec<String> {
        TeraboxConfig::default().allowed_hosts
    }

    #[test]
    fn test_normalize_url_valid() {
        let valid_urls = vec![
            "https://terabox.com/s/1abc",
            "https://www.terabox.com/s/1abc",
            "https://www.1024terabox.com/s/1xyz_-9",
            "http://teraboxapp.com/sharing/link?surl=abc",
            "https://mirrobox.com/s/1q",
        ];

        for url in valid_urls {
            assert_eq!(
                normalize_url(url, &hosts()).as_deref(),
                Ok(url),
                "URL should be valid: {}",
                url
            );
        }
    }

    #[test]
    fn test_normalize_url_invalid() {
        let invalid_urls = vec![
            "",
            "not-a-url",
            "https://example.com/s/1xxxxx",
            "https://pan.baidu.com/s/1xxxxx",
            "mailto:someone@terabox.com",
        ];

        for url in invalid_urls {
            assert_eq!(
                normalize_url(url, &hosts()),
                Err(ExtractError::InvalidUrl),
                "URL should be invalid: {}",
                url
            );
        }
    }

    #[test]
    fn test_extract_share_token() {
        let test_cases = vec![
            ("https://terabox.com/s/1abc123", Some("1abc123")),
            ("https://terabox.com/s/1a_b-c?pwd=1234", Some("1a_b-c")),
            ("https://terabox.com/sharing/link?surl=Qwe12", Some("Qwe12")),
            ("https://terabox.com/other/path", None),
            ("https://terabox.com/s/", None),
        ];

        for (url, expected) in test_cases {
            assert_eq!(
                extract_share_token(url).as_deref(),
                expected,
                "Failed for URL: {}",
                url
            );
        }
    }

    #[test]
    fn test_url_token_takes_precedence() {
        let page = r#"{"fs_id":999,"shareid":5}"#;
        let id = extract_identifier("https://terabox.com/s/ABC123", Some(page)).unwrap();
        assert_eq!(id, "ABC123");
    }

    #[test]
    fn test_page_fallbacks_in_order() {
        let url = "https://terabox.com/wap/share/filelist";
        assert_eq!(
            extract_identifier(url, Some(r#"x "shareid":5 y "fs_id": 999"#)).unwrap(),
            "999"
        );
        assert_eq!(
            extract_identifier(url, Some(r#"{"shareid":42}"#)).unwrap(),
            "42"
        );
        assert_eq!(
            extract_identifier(url, Some("<html></html>")),
            Err(ExtractError::IdentifierNotFound)
        );
        assert_eq!(
            extract_identifier(url, None),
            Err(ExtractError::IdentifierNotFound)
        );
    }
}
