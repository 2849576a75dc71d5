//! 変更履歴（監査証跡）
//!
//! 点検フィールドの変更をレコード化する。永続化は任意・プラガブル:
//! WASM側はベストエフォートでサーバーにPOST、CLI側はローカルJSONに
//! 追記する。失敗しても編集セッションは止めない。

use crate::types::InspectionEntry;
use serde::{Deserialize, Serialize};

/// 変更の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
}

/// 項目1件の変更レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChange {
    pub item_id: String,
    pub change_type: ChangeType,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// ISO 8601タイムスタンプ
    pub changed_at: String,
}

fn change(
    item_id: &str,
    field: &str,
    old: String,
    new: String,
    changed_at: &str,
) -> ItemChange {
    ItemChange {
        item_id: item_id.to_string(),
        change_type: ChangeType::Updated,
        field_name: Some(field.to_string()),
        old_value: Some(old),
        new_value: Some(new),
        changed_at: changed_at.to_string(),
    }
}

/// 2つの点検結果を比較して変更レコードを生成する
///
/// 画像はデータ本体ではなく枚数の変化だけを記録する（履歴テーブルを
/// Data URLで膨らませない）。
pub fn diff_entries(
    item_id: &str,
    old: &InspectionEntry,
    new: &InspectionEntry,
    changed_at: &str,
) -> Vec<ItemChange> {
    let mut changes = Vec::new();

    if old.pass != new.pass {
        changes.push(change(item_id, "pass", old.pass.to_string(), new.pass.to_string(), changed_at));
    }
    if old.fail != new.fail {
        changes.push(change(item_id, "fail", old.fail.to_string(), new.fail.to_string(), changed_at));
    }
    if old.issue != new.issue {
        changes.push(change(item_id, "issue", old.issue.clone(), new.issue.clone(), changed_at));
    }
    if old.images.len() != new.images.len() {
        changes.push(change(
            item_id,
            "images",
            old.images.len().to_string(),
            new.images.len().to_string(),
            changed_at,
        ));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2025-06-01T10:00:00Z";

    #[test]
    fn test_diff_no_change() {
        let entry = InspectionEntry { pass: true, ..Default::default() };
        assert!(diff_entries("item-1", &entry, &entry, TS).is_empty());
    }

    #[test]
    fn test_diff_pass_toggle() {
        let old = InspectionEntry::default();
        let new = InspectionEntry { pass: true, ..Default::default() };
        let changes = diff_entries("item-1", &old, &new, TS);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field_name.as_deref(), Some("pass"));
        assert_eq!(changes[0].old_value.as_deref(), Some("false"));
        assert_eq!(changes[0].new_value.as_deref(), Some("true"));
    }

    #[test]
    fn test_diff_records_image_count_not_data() {
        let old = InspectionEntry::default();
        let new = InspectionEntry {
            images: vec!["data:image/jpeg;base64,AAAA".into()],
            ..Default::default()
        };
        let changes = diff_entries("item-1", &old, &new, TS);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_value.as_deref(), Some("1"));
    }

    #[test]
    fn test_diff_multiple_fields() {
        let old = InspectionEntry { pass: true, ..Default::default() };
        let new = InspectionEntry { fail: true, issue: "bad weld".into(), ..Default::default() };
        let changes = diff_entries("item-1", &old, &new, TS);
        assert_eq!(changes.len(), 3);
    }
}
