//! Background asset acquisition.
//!
//! The card background may be shipped three ways: a filesystem path, an
//! inline `data:` URI, or an http(s) URL. Remote backgrounds are cached on
//! disk so restarts don't refetch:
//!   {cache_dir}/{key}_background.png

use std::path::{Path, PathBuf};

use base64::Engine;
use image::RgbaImage;
use thiserror::Error;

use crate::config::{project_root, CardConfig};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("http: {0}")]
    Http(String),
    #[error("background fetch failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("invalid data URI in background source")]
    DataUri,
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}

pub fn cache_dir() -> PathBuf {
    if let Ok(p) = std::env::var("CARD_CACHE_DIR") {
        return PathBuf::from(p);
    }
    project_root().join("app").join("background_cache")
}

#[derive(Clone, Debug)]
pub struct BackgroundCache {
    path: PathBuf,
}

impl BackgroundCache {
    pub fn new(key: &str) -> Self {
        Self::at(&cache_dir(), key)
    }

    pub fn at(dir: &Path, key: &str) -> Self {
        Self { path: dir.join(format!("{key}_background.png")) }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Vec<u8>, AssetError> {
        Ok(std::fs::read(&self.path)?)
    }

    /// Optimizes once at cache time so request-time reads stay cheap.
    /// Disable with `CARD_CACHE_OPTIMIZE=0`.
    pub fn save(&self, png: &[u8]) -> Result<(), AssetError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let optimize = std::env::var("CARD_CACHE_OPTIMIZE").unwrap_or_else(|_| "1".to_string());
        let optimize = !(optimize == "0" || optimize.eq_ignore_ascii_case("false"));

        let out: Vec<u8> = if optimize {
            let level = std::env::var("CARD_CACHE_OXIPNG_LEVEL")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(4)
                .min(6);
            let mut opts = oxipng::Options::from_preset(level);
            opts.fix_errors = true;
            match oxipng::optimize_from_memory(png, &opts) {
                Ok(optimized) => optimized,
                Err(_) => png.to_vec(),
            }
        } else {
            png.to_vec()
        };

        std::fs::write(&self.path, out)?;
        Ok(())
    }
}

/// Payload of a `data:...;base64,<payload>` URI, or None if `input` is not a
/// data URI at all.
fn data_uri_payload(input: &str) -> Option<&str> {
    let rest = input.trim().strip_prefix("data:")?;
    let (_, b64) = rest.split_once(',')?;
    Some(b64.trim())
}

fn decode_data_uri(input: &str) -> Result<Vec<u8>, AssetError> {
    let payload = data_uri_payload(input).ok_or(AssetError::DataUri)?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| AssetError::DataUri)
}

async fn fetch_remote(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, AssetError> {
    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| AssetError::Http(e.to_string()))?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AssetError::Status { status, body });
    }
    let bytes = resp.bytes().await.map_err(|e| AssetError::Http(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Raw background bytes for the configured source.
pub async fn background_bytes(http: &reqwest::Client, source: &str) -> Result<Vec<u8>, AssetError> {
    let source = source.trim();

    if source.starts_with("data:") {
        return decode_data_uri(source);
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        let cache = BackgroundCache::new("card");
        if cache.exists() {
            return cache.load();
        }
        let bytes = fetch_remote(http, source).await?;
        cache.save(&bytes)?;
        return Ok(bytes);
    }

    let path = Path::new(source);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root().join(path)
    };
    Ok(std::fs::read(path)?)
}

/// Decodes and normalizes the background to canvas dimensions. Regions are
/// defined in canvas space, so the background must match it exactly.
pub fn decode_background(bytes: &[u8], width: u32, height: u32) -> Result<RgbaImage, AssetError> {
    let mut img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() != width || img.height() != height {
        img = image::imageops::resize(&img, width, height, image::imageops::FilterType::Lanczos3);
    }
    Ok(img)
}

pub async fn load_background(
    http: &reqwest::Client,
    cfg: &CardConfig,
) -> Result<RgbaImage, AssetError> {
    let bytes = background_bytes(http, &cfg.background).await?;
    decode_background(&bytes, cfg.canvas.width, cfg.canvas.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba};

    fn tiny_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let enc = image::codecs::png::PngEncoder::new(&mut buf);
        enc.write_image(&img, w, h, image::ExtendedColorType::Rgba8).unwrap();
        buf
    }

    #[test]
    fn data_uri_payload_requires_comma() {
        assert!(data_uri_payload("data:image/png;base64").is_none());
        assert_eq!(data_uri_payload("data:image/png;base64,QUJD"), Some("QUJD"));
        assert!(data_uri_payload("app/assets/bg.png").is_none());
    }

    #[test]
    fn decode_data_uri_roundtrip() {
        let png = tiny_png(2, 2);
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
        let uri = format!("data:image/png;base64,{b64}");
        assert_eq!(decode_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn decode_data_uri_rejects_garbage() {
        assert!(matches!(decode_data_uri("data:image/png;base64,???"), Err(AssetError::DataUri)));
        assert!(matches!(decode_data_uri("plainpath.png"), Err(AssetError::DataUri)));
    }

    #[test]
    fn background_resized_to_canvas() {
        let png = tiny_png(4, 4);
        let img = decode_background(&png, 8, 2).unwrap();
        assert_eq!((img.width(), img.height()), (8, 2));
    }

    #[test]
    fn cache_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BackgroundCache::at(dir.path(), "card");
        assert!(!cache.exists());

        cache.save(&tiny_png(3, 3)).unwrap();
        assert!(cache.exists());

        let bytes = cache.load().unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (3, 3));
    }
}
