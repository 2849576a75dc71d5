//! テンプレート操作
//!
//! シード判定・検証・保存前処理。ストアI/Oは持たず、判定だけを行う
//! 純関数群（実際の読み書きはCLI/WASM側のストアクライアントが担う）。

use crate::default_template::default_template;
use crate::error::{Error, Result};
use crate::types::{Category, TemplateCategory, TemplateData, TemplateItem};
use std::collections::HashSet;

/// ストアが空ならシードすべきテンプレートを返す
///
/// 冪等: 読み込んだテンプレートが空でなければNone（2回目の呼び出しで
/// カテゴリが重複しない）。
pub fn seed_if_empty(loaded: &TemplateData) -> Option<TemplateData> {
    if loaded.is_empty() {
        Some(default_template())
    } else {
        None
    }
}

/// 保存前の整形: sort_orderの振り直しとバージョンのインクリメント
pub fn prepare_for_save(template: &mut TemplateData) {
    template.rewrite_sort_orders();
    template.version += 1;
}

/// マージ済みカテゴリ列から構造フィールドだけを抜き出してテンプレートを作る
///
/// 編集モード終了時の書き戻しに使う。点検フィールド（pass/fail/issue/
/// images）は一切含めない（テンプレートへの逆流はバグ）。
pub fn template_from_categories(
    categories: &[Category],
    product_types: &[String],
    version: u64,
) -> TemplateData {
    let mut template = TemplateData {
        categories: categories
            .iter()
            .map(|cat| TemplateCategory {
                id: cat.id.clone(),
                name: cat.name.clone(),
                sort_order: 0,
                items: cat
                    .items
                    .iter()
                    .map(|item| TemplateItem {
                        id: item.id.clone(),
                        text: item.text.clone(),
                        product_type: item.product_type.clone(),
                        reference_images: item.reference_images.clone(),
                        sort_order: 0,
                    })
                    .collect(),
            })
            .collect(),
        product_types: product_types.to_vec(),
        version,
    };
    template.rewrite_sort_orders();
    template
}

/// テンプレートの整合性チェック
///
/// - 項目IDはレポート内で一意であること
/// - カテゴリIDも一意であること
/// - カテゴリ名が空でないこと
pub fn validate(template: &TemplateData) -> Result<()> {
    let mut cat_ids = HashSet::new();
    let mut item_ids = HashSet::new();

    for cat in &template.categories {
        if cat.name.trim().is_empty() {
            return Err(Error::Template(format!("カテゴリ名が空です: id={}", cat.id)));
        }
        if !cat_ids.insert(cat.id.as_str()) {
            return Err(Error::Template(format!("カテゴリIDが重複しています: {}", cat.id)));
        }
        for item in &cat.items {
            if !item_ids.insert(item.id.as_str()) {
                return Err(Error::Template(format!("項目IDが重複しています: {}", item.id)));
            }
        }
    }

    Ok(())
}

/// 保存時の競合判定（楽観的バージョニング）
///
/// ストア側の現在バージョンが、編集を開始したときのバージョンと
/// 異なっていれば他の編集者が先に保存している。
pub fn check_version_conflict(store_version: u64, base_version: u64) -> Result<()> {
    if store_version != base_version {
        return Err(Error::Template(format!(
            "テンプレートが他の編集者により更新されています (store v{}, base v{})",
            store_version, base_version
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TemplateCategory, TemplateItem};

    #[test]
    fn test_seed_if_empty_returns_default_once() {
        let empty = TemplateData::default();
        let seeded = seed_if_empty(&empty).expect("seedされるべき");
        assert_eq!(seeded.categories.len(), 8);

        // 2回目: シード済みテンプレートに対してはNone → カテゴリ数は不変
        assert!(seed_if_empty(&seeded).is_none());
    }

    #[test]
    fn test_prepare_for_save_bumps_version() {
        let mut template = default_template();
        let before = template.version;
        prepare_for_save(&mut template);
        assert_eq!(template.version, before + 1);
    }

    #[test]
    fn test_validate_accepts_default_template() {
        assert!(validate(&default_template()).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_item_ids() {
        let template = TemplateData {
            categories: vec![TemplateCategory {
                id: "c1".into(),
                name: "Cat".into(),
                items: vec![
                    TemplateItem { id: "dup".into(), ..Default::default() },
                    TemplateItem { id: "dup".into(), ..Default::default() },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate(&template).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_category_name() {
        let template = TemplateData {
            categories: vec![TemplateCategory { id: "c1".into(), name: "  ".into(), ..Default::default() }],
            ..Default::default()
        };
        assert!(validate(&template).is_err());
    }

    #[test]
    fn test_template_from_categories_strips_instance_fields() {
        use crate::cache::InspectionCache;
        use crate::merge::merge;
        use crate::types::InspectionEntry;

        let original = default_template();
        let mut cache = InspectionCache::new();
        cache.insert(
            "item-1-1".into(),
            InspectionEntry { pass: true, issue: "scratch".into(), ..Default::default() },
        );
        let mut merged = merge(&original, &cache);
        merged[0].name = "Material (rev.2)".into();

        let rebuilt = template_from_categories(&merged, &original.product_types, original.version);

        // 構造変更は反映、点検結果はシリアライズにも現れない
        assert_eq!(rebuilt.categories[0].name, "Material (rev.2)");
        assert_eq!(rebuilt.item_count(), original.item_count());
        let json = serde_json::to_string(&rebuilt).expect("serialize失敗");
        assert!(!json.contains("\"pass\""));
        assert!(!json.contains("scratch"));
    }

    #[test]
    fn test_version_conflict() {
        assert!(check_version_conflict(3, 3).is_ok());
        assert!(check_version_conflict(4, 3).is_err());
    }
}
