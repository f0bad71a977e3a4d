//! 直链、缩略图与短链的拼接
//!
//! 直链参数是照着网页端下载地址仿出来的：`sign` 和时间戳取自页面，
//! `fid` 前缀与日志 ID 用随机数填充。服务端是否校验这些随机值并不清楚，
//! 生成的链接不保证一定能下载。

use rand::Rng;

use super::types::{FileRecord, SignContext, Thumbnails, CATEGORY_IMAGE, CATEGORY_VIDEO};
use crate::config::TeraboxConfig;

/// 缩略图尺寸（宽, 高）
pub const THUMBNAIL_PRESETS: [(u32, u32); 4] = [(140, 90), (360, 270), (60, 60), (850, 580)];

/// 随机填充的 `fid` 与日志参数
struct RandomParams {
    fid: String,
    logid: u64,
}

impl RandomParams {
    fn generate<R: Rng + ?Sized>(rng: &mut R, fs_id: u64) -> Self {
        let small: u32 = rng.gen_range(0..=9_999);
        let large: u64 = rng.gen_range(0..=9_999_999_999);
        Self {
            fid: format!("{}-{}-{}", large, small, fs_id),
            logid: rng.gen_range(0..=999_999_999_999_999_999),
        }
    }
}

/// 生成下载直链
pub fn direct_link<R: Rng + ?Sized>(
    config: &TeraboxConfig,
    record: &FileRecord,
    ctx: &SignContext,
    rng: &mut R,
) -> String {
    let params = RandomParams::generate(rng, record.fs_id);
    let r: u32 = rng.gen_range(0..=999_999_999);
    format!(
        "https://{}/file/{}?fid={}&dstime={}&rt=sh&sign={}&expires=8h&chkv=1&chkbd=0&chkpc=&dp-logid={}&dp-callid=0&r={}",
        config.download_host,
        record.fs_id,
        params.fid,
        urlencoding::encode(&ctx.timestamp),
        urlencoding::encode(&ctx.sign),
        params.logid,
        r
    )
}

/// 视频/图片生成 4 个尺寸的缩略图，其余分类返回 `None`
pub fn thumbnails<R: Rng + ?Sized>(
    config: &TeraboxConfig,
    record: &FileRecord,
    ctx: &SignContext,
    rng: &mut R,
) -> Option<Thumbnails> {
    let ft = match record.category {
        CATEGORY_VIDEO => "video",
        CATEGORY_IMAGE => "image",
        _ => return None,
    };

    let params = RandomParams::generate(rng, record.fs_id);
    let base = format!(
        "https://{}/thumbnail/{}",
        config.thumbnail_host, record.fs_id
    );
    let query = format!(
        "fid={}&time={}&rt=sh&sign={}&expires=8h&chkv=0&chkbd=0&chkpc=&dp-logid={}&dp-callid=0",
        params.fid,
        urlencoding::encode(&ctx.timestamp),
        urlencoding::encode(&ctx.sign),
        params.logid
    );

    Some(
        THUMBNAIL_PRESETS
            .iter()
            .map(|(w, h)| {
                (
                    format!("{}x{}", w, h),
                    format!(
                        "{}?{}&size=c{}_u{}&quality=100&vuk=-&ft={}",
                        base, query, w, h, ft
                    ),
                )
            })
            .collect(),
    )
}

/// 短链：`https://<canonical_host>/s/<identifier>`
pub fn short_link(config: &TeraboxConfig, identifier: &str) -> String {
    format!("https://{}/s/{}", config.canonical_host, identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(category: i64) -> FileRecord {
        FileRecord {
            server_filename: "movie.mp4".to_string(),
            size: 1024,
            fs_id: 12345,
            category,
        }
    }

    fn ctx() -> SignContext {
        SignContext {
            server: "s1".to_string(),
            sign: "a+b/c=".to_string(),
            timestamp: "111".to_string(),
        }
    }

    #[test]
    fn test_direct_link_fields() {
        let config = TeraboxConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let link = direct_link(&config, &record(1), &ctx(), &mut rng);

        assert!(link.starts_with("https://d.terabox.com/file/12345?fid="));
        assert!(link.contains("-12345&dstime=111&"));
        assert!(link.contains("&sign=a%2Bb%2Fc%3D&"));
    }

    #[test]
    fn test_direct_link_deterministic_with_seed() {
        let config = TeraboxConfig::default();
        let a = direct_link(&config, &record(1), &ctx(), &mut StdRng::seed_from_u64(9));
        let b = direct_link(&config, &record(1), &ctx(), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_video_thumbnails() {
        let config = TeraboxConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let thumbs = thumbnails(&config, &record(CATEGORY_VIDEO), &ctx(), &mut rng).unwrap();

        assert_eq!(thumbs.len(), 4);
        for (w, h) in THUMBNAIL_PRESETS {
            let url = &thumbs[&format!("{}x{}", w, h)];
            assert!(url.contains(&format!("size=c{}_u{}", w, h)));
            assert!(url.ends_with("ft=video"));
            assert!(url.contains("&time=111&"));
        }
    }

    #[test]
    fn test_image_thumbnails() {
        let config = TeraboxConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let thumbs = thumbnails(&config, &record(CATEGORY_IMAGE), &ctx(), &mut rng).unwrap();
        assert!(thumbs.values().all(|u| u.ends_with("ft=image")));
    }

    #[test]
    fn test_other_category_has_no_thumbnails() {
        let config = TeraboxConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(thumbnails(&config, &record(2), &ctx(), &mut rng).is_none());
        assert!(thumbnails(&config, &record(0), &ctx(), &mut rng).is_none());
    }

    #[test]
    fn test_short_link() {
        let config = TeraboxConfig::default();
        assert_eq!(
            short_link(&config, "1AbcDefGh"),
            "https://1024terabox.com/s/1AbcDefGh"
        );
    }
}
