//! レポートデータの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - TemplateData: 共有テンプレート（構造のみ、中央管理）
//! - InspectionEntry: 端末ローカルの点検結果（インスタンスデータ）
//! - ReportData: 両者をマージした作業用レポート

use serde::{Deserialize, Serialize};

/// 「全製品タイプに適用」を意味する製品タイプの番兵値
pub const COMMON_PRODUCT_TYPE: &str = "Common";

/// 製品タイプの初期値
pub const DEFAULT_PRODUCT_TYPES: &[&str] = &["Multi V", "AHU", "ISC", "Water", "H/Kit", "DOAS"];

/// 製品リストの1行（名称・型式・数量）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub name: String,
    pub model_name: String,
    pub quantity: String,
}

/// チェックリスト項目
///
/// 構造フィールド（text/product_type/reference_images）はテンプレート由来、
/// 点検フィールド（pass/fail/issue/images）はローカルキャッシュ由来。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub pass: bool,
    pub fail: bool,
    pub issue: String,
    /// アップロード画像（Data URL形式）
    pub images: Vec<String>,
    pub product_type: String,
    /// 参考画像（読み取り専用、編集モードでのみ変更可）
    pub reference_images: Vec<String>,
}

impl ChecklistItem {
    /// pass判定を設定する。trueにするとfailは必ずクリアされる
    pub fn set_pass(&mut self, value: bool) {
        self.pass = value;
        if value {
            self.fail = false;
        }
    }

    /// fail判定を設定する。trueにするとpassは必ずクリアされる
    pub fn set_fail(&mut self, value: bool) {
        self.fail = value;
        if value {
            self.pass = false;
        }
    }
}

/// カテゴリ（項目の順序付き集合、順序は意味を持つ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub items: Vec<ChecklistItem>,
}

/// 作業用レポート（テンプレート＋ローカルキャッシュのマージ結果）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    pub title: String,
    pub project_name: String,
    pub opportunity_number: String,
    pub address: String,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub inspection_date: String,
    pub commissioner_signature: String,
    pub installer_signature: String,
    pub customer_signature: String,
    pub product_types: Vec<String>,
}

impl ReportData {
    /// 製品リストの初期行
    pub fn default_products() -> Vec<Product> {
        vec![
            Product { name: "ODU".into(), ..Default::default() },
            Product { name: "IDU".into(), ..Default::default() },
        ]
    }
}

/// テンプレート項目（構造フィールドのみ、点検結果は持たない）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateItem {
    pub id: String,
    pub text: String,
    pub product_type: String,
    pub reference_images: Vec<String>,
    pub sort_order: i32,
}

/// テンプレートカテゴリ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateCategory {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub items: Vec<TemplateItem>,
}

/// 共有テンプレート（チェックリスト構造の中央管理データ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateData {
    pub categories: Vec<TemplateCategory>,
    pub product_types: Vec<String>,
    /// 楽観的バージョン番号（保存時にインクリメント、競合検出用）
    pub version: u64,
}

impl TemplateData {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 全項目数
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// sort_orderを現在の並び順で振り直す（保存前に呼ぶ）
    pub fn rewrite_sort_orders(&mut self) {
        for (ci, cat) in self.categories.iter_mut().enumerate() {
            cat.sort_order = ci as i32;
            for (ii, item) in cat.items.iter_mut().enumerate() {
                item.sort_order = ii as i32;
            }
        }
    }

    /// sort_order順に並べ替える（読み込み直後に呼ぶ）
    pub fn sort_by_order(&mut self) {
        self.categories.sort_by_key(|c| c.sort_order);
        for cat in &mut self.categories {
            cat.items.sort_by_key(|i| i.sort_order);
        }
    }
}

/// 項目1件分の点検結果（ローカルキャッシュのエントリ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionEntry {
    pub pass: bool,
    pub fail: bool,
    pub issue: String,
    pub images: Vec<String>,
}

impl InspectionEntry {
    /// 全フィールドが初期値ならtrue（保存を省略できる）
    pub fn is_blank(&self) -> bool {
        !self.pass && !self.fail && self.issue.is_empty() && self.images.is_empty()
    }

    /// マージ済み項目から点検フィールドだけを抜き出す
    pub fn from_item(item: &ChecklistItem) -> Self {
        Self {
            pass: item.pass,
            fail: item.fail,
            issue: item.issue.clone(),
            images: item.images.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pass_clears_fail() {
        let mut item = ChecklistItem { fail: true, ..Default::default() };
        item.set_pass(true);
        assert!(item.pass);
        assert!(!item.fail);
    }

    #[test]
    fn test_set_fail_clears_pass() {
        let mut item = ChecklistItem { pass: true, ..Default::default() };
        item.set_fail(true);
        assert!(item.fail);
        assert!(!item.pass);
    }

    #[test]
    fn test_set_pass_false_keeps_fail() {
        let mut item = ChecklistItem { fail: true, ..Default::default() };
        item.set_pass(false);
        assert!(!item.pass);
        assert!(item.fail);
    }

    #[test]
    fn test_report_data_serialize_camel_case() {
        let report = ReportData {
            project_name: "Tower A".into(),
            opportunity_number: "OPP-001".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&report).expect("serialize failed");
        assert!(json.contains("\"projectName\":\"Tower A\""));
        assert!(json.contains("\"opportunityNumber\":\"OPP-001\""));
    }

    #[test]
    fn test_template_rewrite_sort_orders() {
        let mut template = TemplateData {
            categories: vec![TemplateCategory {
                id: "b".into(),
                sort_order: 9,
                items: vec![
                    TemplateItem { id: "i2".into(), sort_order: 5, ..Default::default() },
                    TemplateItem { id: "i1".into(), sort_order: 3, ..Default::default() },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        template.rewrite_sort_orders();
        assert_eq!(template.categories[0].sort_order, 0);
        assert_eq!(template.categories[0].items[0].sort_order, 0);
        assert_eq!(template.categories[0].items[1].sort_order, 1);
    }

    #[test]
    fn test_template_sort_by_order() {
        let mut template = TemplateData {
            categories: vec![
                TemplateCategory { id: "b".into(), sort_order: 1, ..Default::default() },
                TemplateCategory { id: "a".into(), sort_order: 0, ..Default::default() },
            ],
            ..Default::default()
        };
        template.sort_by_order();
        assert_eq!(template.categories[0].id, "a");
    }

    #[test]
    fn test_inspection_entry_is_blank() {
        assert!(InspectionEntry::default().is_blank());
        let entry = InspectionEntry { issue: "leak".into(), ..Default::default() };
        assert!(!entry.is_blank());
    }

    #[test]
    fn test_entry_deserialize_missing_fields() {
        let entry: InspectionEntry =
            serde_json::from_str("{\"pass\":true}").expect("deserialize failed");
        assert!(entry.pass);
        assert!(!entry.fail);
        assert!(entry.images.is_empty());
    }
}
