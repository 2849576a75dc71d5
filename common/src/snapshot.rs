//! エクスポート用スナップショット
//!
//! ラスタライズ系のエクスポータはフォーム部品の「現在の入力値」を
//! 読めないため、全フィールド値をフラットなシリアライズ可能形に
//! 写し取って渡す。CLIのHTML出力もこれを入力にする。

use crate::types::ReportData;
use serde::{Deserialize, Serialize};

/// チェック項目1行分のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub id: String,
    pub text: String,
    pub status: String,
    pub issue: String,
    pub product_type: String,
    pub images: Vec<String>,
}

/// カテゴリ1つ分のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCategory {
    pub name: String,
    pub items: Vec<SnapshotItem>,
}

/// レポート全体のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub title: String,
    pub project_name: String,
    pub opportunity_number: String,
    pub address: String,
    pub inspection_date: String,
    pub products: Vec<(String, String, String)>,
    pub categories: Vec<SnapshotCategory>,
    pub commissioner_signature: String,
    pub installer_signature: String,
    pub customer_signature: String,
}

/// 判定状態の表示文字列
pub fn status_label(pass: bool, fail: bool) -> &'static str {
    match (pass, fail) {
        (true, _) => "OK",
        (_, true) => "NG",
        _ => "-",
    }
}

impl ReportSnapshot {
    /// 作業用レポートからスナップショットを構築する
    pub fn capture(report: &ReportData) -> Self {
        Self {
            title: report.title.clone(),
            project_name: report.project_name.clone(),
            opportunity_number: report.opportunity_number.clone(),
            address: report.address.clone(),
            inspection_date: report.inspection_date.clone(),
            products: report
                .products
                .iter()
                .map(|p| (p.name.clone(), p.model_name.clone(), p.quantity.clone()))
                .collect(),
            categories: report
                .categories
                .iter()
                .map(|cat| SnapshotCategory {
                    name: cat.name.clone(),
                    items: cat
                        .items
                        .iter()
                        .map(|item| SnapshotItem {
                            id: item.id.clone(),
                            text: item.text.clone(),
                            status: status_label(item.pass, item.fail).to_string(),
                            issue: item.issue.clone(),
                            product_type: item.product_type.clone(),
                            images: item.images.clone(),
                        })
                        .collect(),
                })
                .collect(),
            commissioner_signature: report.commissioner_signature.clone(),
            installer_signature: report.installer_signature.clone(),
            customer_signature: report.customer_signature.clone(),
        }
    }
}
