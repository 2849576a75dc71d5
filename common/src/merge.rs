//! マージエンジン
//!
//! 共有テンプレート（構造）とローカル点検キャッシュ（結果）から
//! 作業用レポートを組み立てる。ライフサイクルの異なる2系統のデータを
//! 1か所で合成する唯一のモジュール。
//!
//! 不変条件:
//! - 出力はテンプレートの項目と完全に一致し、テンプレート順で並ぶ
//! - 点検フィールドはキャッシュ由来、構造フィールドはテンプレート由来
//! - テンプレートに無い項目のキャッシュエントリは捨てる（存在と順序は
//!   テンプレートが正）

use crate::cache::InspectionCache;
use crate::types::{Category, ChecklistItem, ReportData, TemplateData, COMMON_PRODUCT_TYPE};

/// レポートのメタ情報（マージ対象外のヘッダ部分）
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    pub title: String,
    pub project_name: String,
    pub opportunity_number: String,
    pub address: String,
    pub inspection_date: String,
}

/// テンプレートとキャッシュをマージしてカテゴリ列を生成する
///
/// 純関数。テンプレートの各項目についてキャッシュをIDで引き、
/// あれば点検フィールドを重ね、なければ初期値で埋める。
pub fn merge(template: &TemplateData, cache: &InspectionCache) -> Vec<Category> {
    template
        .categories
        .iter()
        .map(|cat| Category {
            id: cat.id.clone(),
            name: cat.name.clone(),
            items: cat
                .items
                .iter()
                .map(|item| {
                    let entry = cache.get(&item.id).cloned().unwrap_or_default();
                    ChecklistItem {
                        id: item.id.clone(),
                        text: item.text.clone(),
                        pass: entry.pass,
                        fail: entry.fail,
                        issue: entry.issue,
                        images: entry.images,
                        product_type: if item.product_type.is_empty() {
                            COMMON_PRODUCT_TYPE.to_string()
                        } else {
                            item.product_type.clone()
                        },
                        reference_images: item.reference_images.clone(),
                    }
                })
                .collect(),
        })
        .collect()
}

/// マージ結果とメタ情報から完全なReportDataを組み立てる
pub fn build_report(template: &TemplateData, cache: &InspectionCache, meta: &ReportMeta) -> ReportData {
    ReportData {
        title: meta.title.clone(),
        project_name: meta.project_name.clone(),
        opportunity_number: meta.opportunity_number.clone(),
        address: meta.address.clone(),
        products: ReportData::default_products(),
        categories: merge(template, cache),
        inspection_date: meta.inspection_date.clone(),
        commissioner_signature: String::new(),
        installer_signature: String::new(),
        customer_signature: String::new(),
        product_types: template.product_types.clone(),
    }
}

/// マージ済みレポートからインスタンスデータだけを抜き出してキャッシュを作る
///
/// 構造フィールドは含めない（テンプレートへの逆流はバグ）。
/// 全フィールド初期値の項目は保存しない。
pub fn extract_cache(categories: &[Category]) -> InspectionCache {
    let mut cache = InspectionCache::new();
    for cat in categories {
        for item in &cat.items {
            let entry = crate::types::InspectionEntry::from_item(item);
            if !entry.is_blank() {
                cache.insert(item.id.clone(), entry);
            }
        }
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InspectionEntry, TemplateCategory, TemplateItem};

    fn sample_template() -> TemplateData {
        TemplateData {
            categories: vec![
                TemplateCategory {
                    id: "cat-1".into(),
                    name: "Installation".into(),
                    sort_order: 0,
                    items: vec![
                        TemplateItem {
                            id: "item-1".into(),
                            text: "Is SVC area secured?".into(),
                            product_type: "Multi V".into(),
                            sort_order: 0,
                            ..Default::default()
                        },
                        TemplateItem {
                            id: "item-2".into(),
                            text: "Are all connections tight?".into(),
                            sort_order: 1,
                            ..Default::default()
                        },
                    ],
                },
                TemplateCategory {
                    id: "cat-2".into(),
                    name: "Start-up".into(),
                    sort_order: 1,
                    items: vec![TemplateItem {
                        id: "item-3".into(),
                        text: "Test run successful?".into(),
                        sort_order: 0,
                        ..Default::default()
                    }],
                },
            ],
            product_types: vec!["Multi V".into()],
            version: 1,
        }
    }

    #[test]
    fn test_merge_empty_cache_yields_defaults() {
        let template = sample_template();
        let cache = InspectionCache::new();
        let merged = merge(&template, &cache);

        assert_eq!(merged.len(), 2);
        for cat in &merged {
            for item in &cat.items {
                assert!(!item.pass);
                assert!(!item.fail);
                assert_eq!(item.issue, "");
                assert!(item.images.is_empty());
            }
        }
    }

    #[test]
    fn test_merge_overlays_cached_entries() {
        let template = sample_template();
        let mut cache = InspectionCache::new();
        cache.insert(
            "item-2".into(),
            InspectionEntry {
                pass: true,
                issue: "minor scratch".into(),
                images: vec!["data:image/jpeg;base64,AAAA".into()],
                ..Default::default()
            },
        );

        let merged = merge(&template, &cache);
        let item2 = &merged[0].items[1];
        assert!(item2.pass);
        assert_eq!(item2.issue, "minor scratch");
        assert_eq!(item2.images.len(), 1);
        // 構造フィールドはテンプレート由来のまま
        assert_eq!(item2.text, "Are all connections tight?");
    }

    #[test]
    fn test_merge_drops_stale_cache_entries() {
        let template = sample_template();
        let mut cache = InspectionCache::new();
        cache.insert("deleted-item".into(), InspectionEntry { fail: true, ..Default::default() });

        let merged = merge(&template, &cache);
        let ids: Vec<&str> = merged
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.id.as_str()))
            .collect();
        assert_eq!(ids, vec!["item-1", "item-2", "item-3"]);
    }

    #[test]
    fn test_merge_preserves_template_order() {
        let template = sample_template();
        let cache = InspectionCache::new();
        let merged = merge(&template, &cache);
        assert_eq!(merged[0].name, "Installation");
        assert_eq!(merged[1].name, "Start-up");
        assert_eq!(merged[0].items[0].id, "item-1");
        assert_eq!(merged[0].items[1].id, "item-2");
    }

    #[test]
    fn test_merge_idempotent() {
        let template = sample_template();
        let mut cache = InspectionCache::new();
        cache.insert("item-1".into(), InspectionEntry { pass: true, ..Default::default() });

        let first = merge(&template, &cache);
        let second = merge(&template, &cache);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_empty_product_type_becomes_common() {
        let template = sample_template();
        let merged = merge(&template, &InspectionCache::new());
        assert_eq!(merged[0].items[1].product_type, COMMON_PRODUCT_TYPE);
        assert_eq!(merged[0].items[0].product_type, "Multi V");
    }

    #[test]
    fn test_extract_cache_skips_blank_and_keeps_instance_fields() {
        let template = sample_template();
        let mut merged = merge(&template, &InspectionCache::new());
        merged[0].items[0].set_fail(true);
        merged[0].items[0].issue = "loose bolt".into();

        let cache = extract_cache(&merged);
        assert_eq!(cache.len(), 1);
        let entry = cache.get("item-1").expect("entry missing");
        assert!(entry.fail);
        assert_eq!(entry.issue, "loose bolt");
    }

    #[test]
    fn test_roundtrip_survives_remerge() {
        // 編集 → キャッシュ抽出 → 再マージ（リロード相当）で結果が残る
        let template = sample_template();
        let mut merged = merge(&template, &InspectionCache::new());
        merged[1].items[0].set_pass(true);

        let cache = extract_cache(&merged);
        let remerged = merge(&template, &cache);
        assert!(remerged[1].items[0].pass);
        assert!(!remerged[1].items[0].fail);
    }

    #[test]
    fn test_build_report_carries_meta_and_product_types() {
        let template = sample_template();
        let meta = ReportMeta {
            title: "LGE SAC Commissioning Report".into(),
            project_name: "Site B".into(),
            ..Default::default()
        };
        let report = build_report(&template, &InspectionCache::new(), &meta);
        assert_eq!(report.title, "LGE SAC Commissioning Report");
        assert_eq!(report.project_name, "Site B");
        assert_eq!(report.product_types, vec!["Multi V".to_string()]);
        assert_eq!(report.products.len(), 2);
    }
}
