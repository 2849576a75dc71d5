//! localStorageバックエンド
//!
//! 点検キャッシュ（項目ID→点検結果）とレポートのヘッダ情報を
//! それぞれ別キーで保存する。読み込みは常に成功する（欠損・破損は
//! 初期値に倒す）。書き込みはクォータ超過を文字列エラーで返し、
//! 呼び出し側が通知に変換する。

use commissioning_report_common::{InspectionCache, Product, ReportData, STORAGE_KEY};
use serde::{Deserialize, Serialize};

/// ヘッダ情報の保存キー（キャッシュ本体とは別に小さく保つ）
const META_KEY: &str = "lge-sac-commissioning-report-meta";

/// 現在時刻（ミリ秒）。Debouncerの論理クロックに使う
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// 点検キャッシュを読み込む。未保存・破損・バージョン不一致は空
pub fn load_cache() -> InspectionCache {
    match local_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten()) {
        Some(json) => InspectionCache::from_json(&json),
        None => InspectionCache::new(),
    }
}

/// 点検キャッシュを書き込む
///
/// set_itemの失敗はほぼクォータ超過（画像データの膨張）。
pub fn save_cache(cache: &InspectionCache) -> Result<(), String> {
    let storage =
        local_storage().ok_or_else(|| "localStorageが利用できません".to_string())?;
    let json = cache.to_json().map_err(|e| e.to_string())?;
    storage.set_item(STORAGE_KEY, &json).map_err(|_| {
        "保存容量の上限を超えました。画像を減らしてください".to_string()
    })
}

/// レポートのヘッダ情報（テンプレートともキャッシュとも独立した部分）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaBlob {
    pub title: String,
    pub project_name: String,
    pub opportunity_number: String,
    pub address: String,
    pub inspection_date: String,
    pub products: Vec<Product>,
    pub commissioner_signature: String,
    pub installer_signature: String,
    pub customer_signature: String,
}

impl MetaBlob {
    pub fn from_report(report: &ReportData) -> Self {
        Self {
            title: report.title.clone(),
            project_name: report.project_name.clone(),
            opportunity_number: report.opportunity_number.clone(),
            address: report.address.clone(),
            inspection_date: report.inspection_date.clone(),
            products: report.products.clone(),
            commissioner_signature: report.commissioner_signature.clone(),
            installer_signature: report.installer_signature.clone(),
            customer_signature: report.customer_signature.clone(),
        }
    }

    /// マージ直後のレポートに保存済みヘッダを重ねる
    pub fn apply_to(&self, report: &mut ReportData) {
        report.title = self.title.clone();
        report.project_name = self.project_name.clone();
        report.opportunity_number = self.opportunity_number.clone();
        report.address = self.address.clone();
        report.inspection_date = self.inspection_date.clone();
        if !self.products.is_empty() {
            report.products = self.products.clone();
        }
        report.commissioner_signature = self.commissioner_signature.clone();
        report.installer_signature = self.installer_signature.clone();
        report.customer_signature = self.customer_signature.clone();
    }
}

pub fn load_meta() -> MetaBlob {
    match local_storage().and_then(|s| s.get_item(META_KEY).ok().flatten()) {
        Some(json) => serde_json::from_str(&json).unwrap_or_default(),
        None => MetaBlob::default(),
    }
}

pub fn save_meta(report: &ReportData) -> Result<(), String> {
    let storage =
        local_storage().ok_or_else(|| "localStorageが利用できません".to_string())?;
    let json = serde_json::to_string(&MetaBlob::from_report(report))
        .map_err(|e| e.to_string())?;
    storage
        .set_item(META_KEY, &json)
        .map_err(|_| "保存容量の上限を超えました".to_string())
}

/// ローカルデータの全消去（明示操作でのみ呼ぶ）
pub fn clear_all() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(STORAGE_KEY);
        let _ = storage.remove_item(META_KEY);
    }
}
