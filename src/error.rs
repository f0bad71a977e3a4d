//! 解析流程的错误类型
//!
//! 每个阶段失败都立即终止，不做重试。`Display` 文本即返回给调用方的状态消息。

/// 解析失败原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// URL 无法解析或域名不在白名单中
    #[error("Invalid URL")]
    InvalidUrl,

    /// 网络错误、非 2xx 状态码或超时
    #[error("Failed to fetch page: {0}")]
    FetchFailed(String),

    #[error("Identifier not found")]
    IdentifierNotFound,

    /// 页面中没有内嵌的数据赋值语句
    #[error("Page data not found")]
    PageDataNotFound,

    #[error("Invalid page data: {0}")]
    PageDataInvalid(String),

    #[error("No files found")]
    EmptyFileList,

    /// 处理过程中的意外错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// 意外错误映射为 500，其余都是可识别的解析失败（400）
    pub fn is_internal(&self) -> bool {
        matches!(self, ExtractError::Internal(_))
    }
}
