//! 画像の取り込みと正規化
//!
//! ユーザー選択の画像ファイルを、埋め込み可能なData URLに変換する。
//! デコード → 長辺が上限を超えないよう縮小（アスペクト比維持）→
//! JPEG再圧縮 → base64エンコード。
//!
//! バッチはピークメモリを抑えるため1枚ずつ順次処理する。
//! 1枚の失敗（破損・サイズ超過）はスキップして残りを続行する。

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;

/// 正規化オプション
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// 縮小後の最大辺長（px）
    pub max_dimension: u32,
    /// JPEG品質 (0-100)
    pub jpeg_quality: u8,
    /// 入力1ファイルの最大バイト数
    pub max_file_bytes: usize,
    /// 1項目あたりの画像上限枚数
    pub max_images_per_item: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1280,
            jpeg_quality: 80,
            max_file_bytes: 10 * 1024 * 1024,
            max_images_per_item: 10,
        }
    }
}

/// バッチ内の1ファイルの失敗
#[derive(Debug, Clone)]
pub struct FileError {
    pub file_name: String,
    pub message: String,
}

/// バッチ処理の結果
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// 成功分のData URL（選択順）
    pub images: Vec<String>,
    pub errors: Vec<FileError>,
}

/// 1枚の画像を正規化してData URLにする
pub fn normalize(bytes: &[u8], opts: &NormalizeOptions) -> Result<String> {
    if bytes.len() > opts.max_file_bytes {
        return Err(Error::Image(format!(
            "ファイルが大きすぎます: {}KB (上限 {}KB)",
            bytes.len() / 1024,
            opts.max_file_bytes / 1024
        )));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::Image(format!("画像のデコードに失敗: {}", e)))?;

    let img = if img.width() > opts.max_dimension || img.height() > opts.max_dimension {
        img.thumbnail(opts.max_dimension, opts.max_dimension)
    } else {
        img
    };

    // JPEGはアルファ非対応のためRGB化してから再圧縮
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut encoded = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut encoded);
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, opts.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| Error::Image(format!("JPEG再圧縮に失敗: {}", e)))?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&encoded)))
}

/// 複数ファイルを順次正規化する
///
/// `existing_count`は項目が既に持つ画像枚数。上限に達した分は
/// エラーとして記録し、処理済み分は選択順で返す。
pub fn normalize_batch(
    files: &[(String, Vec<u8>)],
    opts: &NormalizeOptions,
    existing_count: usize,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (file_name, bytes) in files {
        if existing_count + outcome.images.len() >= opts.max_images_per_item {
            outcome.errors.push(FileError {
                file_name: file_name.clone(),
                message: format!("画像は1項目{}枚までです", opts.max_images_per_item),
            });
            continue;
        }

        match normalize(bytes, opts) {
            Ok(data_url) => outcome.images.push(data_url),
            Err(e) => outcome.errors.push(FileError {
                file_name: file_name.clone(),
                message: e.to_string(),
            }),
        }
    }

    outcome
}

/// Data URLからMIMEタイプを抽出（失敗時は"image/jpeg"）
pub fn mime_of_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

/// Data URLのbase64ペイロード部分
pub fn base64_payload(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLを生バイト列にデコードする（エクスポート時に使用）
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = base64_payload(data_url)
        .ok_or_else(|| Error::Image("Data URL形式ではありません".into()))?;
    BASE64
        .decode(payload)
        .map_err(|e| Error::Image(format!("base64デコードに失敗: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// テスト用の単色PNGを生成
    fn make_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("PNG生成失敗");
        bytes
    }

    #[test]
    fn test_normalize_produces_jpeg_data_url() {
        let png = make_png(64, 48);
        let data_url = normalize(&png, &NormalizeOptions::default()).expect("normalize失敗");
        assert!(data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_normalize_downscales_preserving_aspect() {
        let png = make_png(400, 200);
        let opts = NormalizeOptions { max_dimension: 100, ..Default::default() };
        let data_url = normalize(&png, &opts).expect("normalize失敗");

        let jpeg = decode_data_url(&data_url).expect("デコード失敗");
        let img = image::load_from_memory(&jpeg).expect("JPEG読み込み失敗");
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
    }

    #[test]
    fn test_normalize_keeps_small_images() {
        let png = make_png(32, 32);
        let data_url = normalize(&png, &NormalizeOptions::default()).expect("normalize失敗");
        let jpeg = decode_data_url(&data_url).expect("デコード失敗");
        let img = image::load_from_memory(&jpeg).expect("JPEG読み込み失敗");
        assert_eq!(img.width(), 32);
        assert_eq!(img.height(), 32);
    }

    #[test]
    fn test_normalize_rejects_oversized_file() {
        let opts = NormalizeOptions { max_file_bytes: 10, ..Default::default() };
        let png = make_png(32, 32);
        assert!(normalize(&png, &opts).is_err());
    }

    #[test]
    fn test_normalize_rejects_corrupt_bytes() {
        let result = normalize(b"not an image", &NormalizeOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_skips_bad_file_and_continues() {
        let files = vec![
            ("good1.png".to_string(), make_png(16, 16)),
            ("broken.png".to_string(), b"garbage".to_vec()),
            ("good2.png".to_string(), make_png(16, 16)),
        ];
        let outcome = normalize_batch(&files, &NormalizeOptions::default(), 0);
        assert_eq!(outcome.images.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].file_name, "broken.png");
    }

    #[test]
    fn test_batch_respects_per_item_limit() {
        let files: Vec<(String, Vec<u8>)> = (0..3)
            .map(|i| (format!("f{}.png", i), make_png(8, 8)))
            .collect();
        let opts = NormalizeOptions { max_images_per_item: 2, ..Default::default() };

        // 既に1枚ある項目に3枚追加 → 1枚だけ成功
        let outcome = normalize_batch(&files, &opts, 1);
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn test_mime_and_payload_helpers() {
        assert_eq!(mime_of_data_url("data:image/png;base64,AAAA"), "image/png");
        assert_eq!(mime_of_data_url("garbage"), "image/jpeg");
        assert_eq!(base64_payload("data:image/png;base64,AAAA"), Some("AAAA"));
        assert_eq!(base64_payload("garbage"), None);
    }
}
