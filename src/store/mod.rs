//! ローカルファイルストア
//!
//! レポート本体・点検キャッシュ・テンプレート・変更履歴をJSONファイルで
//! 読み書きする。キャッシュはレポートと同じフォルダに隠しファイルとして
//! 置き、壊れていても空キャッシュとして起動する。

pub mod http;

use crate::error::{ReportCliError, Result};
use commissioning_report_common::{history::ItemChange, InspectionCache, ReportData, TemplateData};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".inspection-cache.json";
const HISTORY_FILE_NAME: &str = ".item-history.json";

/// レポートJSONを読み込む
pub fn load_report(path: &Path) -> Result<ReportData> {
    if !path.exists() {
        return Err(ReportCliError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let report: ReportData = serde_json::from_reader(BufReader::new(file))?;
    Ok(report)
}

/// レポートJSONを保存する
pub fn save_report(path: &Path, report: &ReportData) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

/// キャッシュファイルのパス
pub fn cache_path(folder: &Path) -> PathBuf {
    folder.join(CACHE_FILE_NAME)
}

/// 点検キャッシュを読み込む
///
/// ファイルなし・読み込み失敗・パース失敗はすべて空キャッシュ。
pub fn load_cache(folder: &Path) -> InspectionCache {
    let path = cache_path(folder);
    match std::fs::read_to_string(&path) {
        Ok(json) => InspectionCache::from_json(&json),
        Err(_) => InspectionCache::new(),
    }
}

/// 点検キャッシュを保存する
pub fn save_cache(folder: &Path, cache: &InspectionCache) -> Result<()> {
    let json = cache.to_json()?;
    std::fs::write(cache_path(folder), json)?;
    Ok(())
}

/// キャッシュファイルを削除する。存在しなければfalse
pub fn clear_cache(folder: &Path) -> Result<bool> {
    let path = cache_path(folder);
    if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// テンプレートファイルを読み込む（読み込み後にsort_order順へ整列）
pub fn load_template_file(path: &Path) -> Result<TemplateData> {
    if !path.exists() {
        return Err(ReportCliError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut template: TemplateData = serde_json::from_reader(BufReader::new(file))?;
    template.sort_by_order();
    Ok(template)
}

/// テンプレートファイルを保存する
pub fn save_template_file(path: &Path, template: &TemplateData) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), template)?;
    Ok(())
}

/// 変更履歴をローカルファイルに追記する（ベストエフォート）
pub fn append_history(folder: &Path, changes: &[ItemChange]) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }

    let path = folder.join(HISTORY_FILE_NAME);
    let mut existing: Vec<ItemChange> = match std::fs::read_to_string(&path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    existing.extend_from_slice(changes);

    let file = File::create(&path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &existing)?;
    Ok(())
}
