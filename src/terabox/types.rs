//! 数据类型

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::error::ExtractError;

/// 分类码：视频
pub const CATEGORY_VIDEO: i64 = 1;
/// 分类码：图片
pub const CATEGORY_IMAGE: i64 = 3;

/// 页面内嵌数据中 `file_list` 的单个文件
#[derive(Debug, Clone, Deserialize)]
pub struct FileRecord {
    #[serde(default = "unknown_filename")]
    pub server_filename: String,
    #[serde(default, deserialize_with = "string_or_u64")]
    pub size: u64,
    #[serde(default, alias = "fsid", deserialize_with = "string_or_u64")]
    pub fs_id: u64,
    #[serde(default, deserialize_with = "string_or_i64")]
    pub category: i64,
}

fn unknown_filename() -> String {
    "Unknown".to_string()
}

/// 内嵌数据顶层结构，只取用得到的字段
#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_list: Vec<FileRecord>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sign: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: String,
}

/// 构造直链需要的服务端上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignContext {
    pub server: String,
    pub sign: String,
    pub timestamp: String,
}

/// 缩略图尺寸 -> URL，键形如 `140x90`
pub type Thumbnails = BTreeMap<String, String>;

/// 单个文件的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub title: String,
    pub size: String,
    pub direct_link: String,
    pub thumbnails: Option<Thumbnails>,
}

/// 一次解析的最终结果：成功或失败，只会是其中之一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Success { info: FileInfo, short_link: String },
    Failure(ExtractError),
}

pub const STATUS_KEY: &str = "status";
pub const STATUS_SUCCESS: &str = "✅ Success";
pub const INFO_KEY: &str = "📜 Extracted Info";
pub const TITLE_KEY: &str = "📂 Title";
pub const SIZE_KEY: &str = "📏 Size";
pub const DIRECT_LINK_KEY: &str = "🔽 Direct Download Link";
pub const THUMBNAILS_KEY: &str = "🖼️ Thumbnails";
pub const SHORT_LINK_KEY: &str = "🔗 ShortLink";

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    /// 失败时的状态文本
    pub fn failure_status(message: impl std::fmt::Display) -> String {
        format!("❌ {}", message)
    }
}

impl From<Result<(FileInfo, String), ExtractError>> for ExtractionResult {
    fn from(res: Result<(FileInfo, String), ExtractError>) -> Self {
        match res {
            Ok((info, short_link)) => ExtractionResult::Success { info, short_link },
            Err(e) => ExtractionResult::Failure(e),
        }
    }
}

impl Serialize for FileInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let empty = Thumbnails::new();
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(TITLE_KEY, &self.title)?;
        map.serialize_entry(SIZE_KEY, &self.size)?;
        map.serialize_entry(DIRECT_LINK_KEY, &self.direct_link)?;
        map.serialize_entry(THUMBNAILS_KEY, self.thumbnails.as_ref().unwrap_or(&empty))?;
        map.end()
    }
}

/// 对外的 JSON 形状：调用方只靠 `status` 中是否含有 `Success` 区分成败
impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtractionResult::Success { info, short_link } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(STATUS_KEY, STATUS_SUCCESS)?;
                map.serialize_entry(INFO_KEY, std::slice::from_ref(info))?;
                map.serialize_entry(SHORT_LINK_KEY, short_link)?;
                map.end()
            }
            ExtractionResult::Failure(e) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(STATUS_KEY, &Self::failure_status(e))?;
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Null,
}

/// 自定义反序列化：支持字符串或数字类型的整数
fn string_or_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Loose::deserialize(deserializer)? {
        Loose::Str(s) if s.trim().is_empty() => Ok(0),
        Loose::Str(s) => s.trim().parse().map_err(Error::custom),
        Loose::Uint(n) => Ok(n),
        Loose::Int(n) => u64::try_from(n).map_err(Error::custom),
        Loose::Float(f) if f >= 0.0 => Ok(f as u64),
        Loose::Float(f) => Err(Error::custom(format!("negative value: {}", f))),
        Loose::Null => Ok(0),
    }
}

fn string_or_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Loose::deserialize(deserializer)? {
        Loose::Str(s) if s.trim().is_empty() => Ok(0),
        Loose::Str(s) => s.trim().parse().map_err(Error::custom),
        Loose::Int(n) => Ok(n),
        Loose::Uint(n) => i64::try_from(n).map_err(Error::custom),
        Loose::Float(f) => Ok(f as i64),
        Loose::Null => Ok(0),
    }
}

/// `file_list: null` 与缺省一样视为空列表
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FileRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FileRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `timestamp` 等字段可能是数字也可能是字符串，统一转成字符串
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Str(s) => s,
        Loose::Int(n) => n.to_string(),
        Loose::Uint(n) => n.to_string(),
        Loose::Float(f) => f.to_string(),
        Loose::Null => String::new(),
    })
}
