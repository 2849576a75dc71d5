//! ローカル点検キャッシュ
//!
//! 項目ID → 点検結果のマップをバージョン付きJSONブロブとして永続化する。
//! リロードをまたいで点検結果を保持し、1キーストロークごとの
//! サーバー往復を不要にする。
//!
//! パース失敗・バージョン不一致は空キャッシュとして扱う（起動を
//! ブロックしない）。保存はバックエンド側でデバウンスされる。

use crate::types::InspectionEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// localStorage / キャッシュファイルの保存キー
pub const STORAGE_KEY: &str = "lge-sac-commissioning-report";

/// 警告を出すサイズ閾値（画像データで膨らむ想定、5MB）
pub const SIZE_WARNING_BYTES: usize = 5 * 1024 * 1024;

/// 書き込みを拒否する上限（localStorageのクォータ相当、10MB）
pub const SIZE_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// キャッシュサイズの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    Ok,
    /// 閾値接近。警告を表示するが保存は続行
    NearLimit,
    /// 上限超過。保存失敗が予想されるため画像削減を促す
    OverLimit,
}

/// キャッシュブロブの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 項目ID → 点検結果のマップ
    entries: HashMap<String, InspectionEntry>,
}

impl InspectionCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// JSON文字列から読み込む
    ///
    /// 壊れたJSON・バージョン不一致は空キャッシュを返す。
    /// ローカル編集は失われるがクラッシュはしない。
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<InspectionCache>(json) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            _ => Self::default(),
        }
    }

    /// JSON文字列に書き出す
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, item_id: &str) -> Option<&InspectionEntry> {
        self.entries.get(item_id)
    }

    /// エントリを登録する。初回編集時に暗黙に作られる
    pub fn insert(&mut self, item_id: String, entry: InspectionEntry) {
        self.entries.insert(item_id, entry);
    }

    pub fn remove(&mut self, item_id: &str) -> Option<InspectionEntry> {
        self.entries.remove(item_id)
    }

    /// 全ローカルデータのリセット（明示操作でのみ呼ぶ）
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// シリアライズ後の概算バイト数（主に埋め込み画像で決まる）
    pub fn approx_size_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(id, entry)| {
                id.len()
                    + entry.issue.len()
                    + entry.images.iter().map(|i| i.len()).sum::<usize>()
                    + 64
            })
            .sum()
    }

    /// サイズ閾値の判定
    pub fn size_check(&self) -> SizeCheck {
        let size = self.approx_size_bytes();
        if size > SIZE_LIMIT_BYTES {
            SizeCheck::OverLimit
        } else if size > SIZE_WARNING_BYTES {
            SizeCheck::NearLimit
        } else {
            SizeCheck::Ok
        }
    }
}

impl Default for InspectionCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_empty() {
        let cache = InspectionCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.size_check(), SizeCheck::Ok);
    }

    #[test]
    fn test_cache_roundtrip() {
        let mut cache = InspectionCache::new();
        cache.insert(
            "item-1".into(),
            InspectionEntry { pass: true, issue: "ok".into(), ..Default::default() },
        );

        let json = cache.to_json().expect("serialize failed");
        let loaded = InspectionCache::from_json(&json);
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("item-1").expect("entry missing").pass);
    }

    #[test]
    fn test_cache_corrupt_json_yields_empty() {
        let cache = InspectionCache::from_json("{not json at all");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_version_mismatch_yields_empty() {
        let json = "{\"version\":99,\"entries\":{\"x\":{\"pass\":true,\"fail\":false,\"issue\":\"\",\"images\":[]}}}";
        let cache = InspectionCache::from_json(json);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = InspectionCache::new();
        cache.insert("a".into(), InspectionEntry::default());
        cache.insert("b".into(), InspectionEntry::default());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_size_check_near_limit() {
        let mut cache = InspectionCache::new();
        // 6MB相当の疑似画像データ
        cache.insert(
            "big".into(),
            InspectionEntry { images: vec!["x".repeat(6 * 1024 * 1024)], ..Default::default() },
        );
        assert_eq!(cache.size_check(), SizeCheck::NearLimit);
    }

    #[test]
    fn test_size_check_over_limit() {
        let mut cache = InspectionCache::new();
        cache.insert(
            "huge".into(),
            InspectionEntry { images: vec!["x".repeat(11 * 1024 * 1024)], ..Default::default() },
        );
        assert_eq!(cache.size_check(), SizeCheck::OverLimit);
    }
}
