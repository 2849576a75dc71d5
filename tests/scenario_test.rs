//! 点検ワークフローの統合テスト
//!
//! テンプレート取得 → マージ → 編集 → キャッシュ保存 → リロード、
//! および編集モードでのテンプレート書き戻しまでの一連の流れを検証する。

use commissioning_report_common::{
    default_template, extract_cache, merge, prepare_for_save, seed_if_empty,
    template_from_categories, AccessGate, Credential, Debouncer, GateConfig, InspectionCache,
    TemplateData,
};
use commissioning_report_rust::store;
use tempfile::tempdir;

#[test]
fn test_first_visit_edit_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = default_template();

    // 初回訪問: キャッシュなし → 全項目未判定
    let mut merged = merge(&template, &store::load_cache(dir.path()));
    assert!(merged.iter().all(|c| c.items.iter().all(|i| !i.pass && !i.fail)));

    // 点検: 最初の項目をOKにして問題メモを残す
    merged[0].items[0].set_pass(true);
    merged[0].items[0].issue = "配管ラベル一部剥がれ".into();
    store::save_cache(dir.path(), &extract_cache(&merged)).expect("キャッシュ保存失敗");

    // リロード相当: キャッシュを読み直して同じテンプレートと再マージ
    let remerged = merge(&template, &store::load_cache(dir.path()));
    assert!(remerged[0].items[0].pass);
    assert_eq!(remerged[0].items[0].issue, "配管ラベル一部剥がれ");
    // 他の項目は未判定のまま
    assert!(!remerged[0].items[1].pass);
}

#[test]
fn test_corrupt_cache_does_not_block_startup() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(store::cache_path(dir.path()), "{]not json").expect("書き込み失敗");

    let merged = merge(&default_template(), &store::load_cache(dir.path()));
    assert_eq!(merged.len(), default_template().categories.len());
    assert!(merged.iter().all(|c| c.items.iter().all(|i| !i.pass && !i.fail)));
}

#[test]
fn test_seeding_is_idempotent() {
    let empty = TemplateData::default();
    let seeded = seed_if_empty(&empty).expect("空ストアにはシードされるべき");
    let count = seeded.categories.len();

    // 2回目のシード判定はNo-op → カテゴリ数は増えない
    assert!(seed_if_empty(&seeded).is_none());
    assert_eq!(seeded.categories.len(), count);
}

#[test]
fn test_debounced_burst_flushes_once_with_final_value() {
    let template = default_template();
    let mut merged = merge(&template, &InspectionCache::new());
    let mut debouncer = Debouncer::new(500);
    let dir = tempdir().expect("Failed to create temp dir");

    // 連続3編集: NG → OK → 問題メモ
    merged[0].items[0].set_fail(true);
    debouncer.record_edit(1000);
    merged[0].items[0].set_pass(true);
    debouncer.record_edit(1100);
    merged[0].items[0].issue = "final".into();
    let last_seq = debouncer.record_edit(1200);

    // 最後の編集から500ms経過するまでフラッシュしない
    assert_eq!(debouncer.poll(1500), None);

    // 窓が閉じたらちょうど1回、最終状態で書く
    assert_eq!(debouncer.poll(1700), Some(last_seq));
    store::save_cache(dir.path(), &extract_cache(&merged)).expect("キャッシュ保存失敗");
    assert_eq!(debouncer.poll(2500), None);

    let loaded = store::load_cache(dir.path());
    let entry = loaded.get(&merged[0].items[0].id).expect("エントリなし");
    assert!(entry.pass);
    assert!(!entry.fail);
    assert_eq!(entry.issue, "final");
}

#[test]
fn test_edit_mode_rename_writes_back_template_once() {
    let template = default_template();
    let mut gate = AccessGate::new(GateConfig::with_password("site-admin"));

    // 間違ったパスワードでは入れない
    assert!(gate.unlock(&Credential::Password("guess".into())).is_err());
    assert!(!gate.can_edit());

    gate.unlock(&Credential::Password("site-admin".into())).expect("解錠失敗");

    // 点検結果を付けた状態でカテゴリ名を変更
    let mut merged = merge(&template, &InspectionCache::new());
    merged[0].items[0].set_pass(true);
    merged[0].name = "Material (rev.2)".into();
    gate.mark_template_dirty();

    // 編集モード終了: この遷移でちょうど1回書き戻す
    assert!(gate.lock());
    assert!(!gate.lock());

    let mut rebuilt =
        template_from_categories(&merged, &template.product_types, template.version);
    prepare_for_save(&mut rebuilt);

    // 構造変更は反映、バージョンは1つ進む、項目IDは維持
    assert_eq!(rebuilt.categories[0].name, "Material (rev.2)");
    assert_eq!(rebuilt.version, template.version + 1);
    assert_eq!(rebuilt.categories[0].items[0].id, template.categories[0].items[0].id);

    // ワイヤ上に点検フィールドは現れない
    let json = serde_json::to_string(&rebuilt).expect("serialize失敗");
    assert!(!json.contains("\"pass\""));
    assert!(!json.contains("\"issue\""));
}

#[test]
fn test_reorder_round_trips_in_new_order() {
    let template = default_template();
    let mut merged = merge(&template, &InspectionCache::new());

    // 編集モードでの並び替え相当: カテゴリ1↔2、先頭カテゴリの項目1↔2
    merged.swap(0, 1);
    merged[0].items.swap(0, 1);

    let mut rebuilt =
        template_from_categories(&merged, &template.product_types, template.version);
    prepare_for_save(&mut rebuilt);

    // 新しい並びがそのまま書き戻される
    assert_eq!(rebuilt.categories[0].id, template.categories[1].id);
    assert_eq!(rebuilt.categories[1].id, template.categories[0].id);
    assert_eq!(rebuilt.categories[0].items[0].id, template.categories[1].items[1].id);
    assert_eq!(rebuilt.categories[0].items[1].id, template.categories[1].items[0].id);

    // sort_orderも新しい並びで振り直される
    assert_eq!(rebuilt.categories[0].sort_order, 0);
    assert_eq!(rebuilt.categories[1].sort_order, 1);
    assert_eq!(rebuilt.categories[0].items[0].sort_order, 0);

    // 読み込み側は行順が乱れてもsort_orderで同じ並びに戻る
    let mut reloaded = rebuilt.clone();
    reloaded.categories.swap(0, 1);
    reloaded.categories[0].items.reverse();
    reloaded.sort_by_order();
    assert_eq!(reloaded, rebuilt);
}

#[test]
fn test_edit_mode_product_types_and_reference_images_write_back() {
    let template = default_template();
    let mut merged = merge(&template, &InspectionCache::new());

    // 編集モードでの変更: 対象製品・参考画像・製品タイプ一覧
    merged[0].items[0].product_type = "AHU".into();
    merged[0].items[0].reference_images.push("data:image/jpeg;base64,REF".into());
    let mut product_types = template.product_types.clone();
    product_types.push("Chiller".into());

    let mut rebuilt = template_from_categories(&merged, &product_types, template.version);
    prepare_for_save(&mut rebuilt);

    assert_eq!(rebuilt.categories[0].items[0].product_type, "AHU");
    assert_eq!(
        rebuilt.categories[0].items[0].reference_images,
        vec!["data:image/jpeg;base64,REF".to_string()]
    );
    assert!(rebuilt.product_types.contains(&"Chiller".to_string()));
}

/// 保存呼び出しを数えるだけのテンプレートストア
#[derive(Default)]
struct RecordingStore {
    saved: Vec<TemplateData>,
}

impl RecordingStore {
    fn save_template(&mut self, template: &TemplateData) {
        self.saved.push(template.clone());
    }
}

#[test]
fn test_exit_edit_mode_saves_template_exactly_once() {
    let template = default_template();
    let mut gate = AccessGate::new(GateConfig::with_password("pw"));
    let mut store = RecordingStore::default();

    gate.unlock(&Credential::Password("pw".into())).expect("解錠失敗");
    let mut merged = merge(&template, &InspectionCache::new());
    merged[0].name = "Material (rev.2)".into();
    gate.mark_template_dirty();

    // 終了処理が重複して呼ばれても保存は1回だけ
    for _ in 0..2 {
        if gate.lock() {
            let mut rebuilt =
                template_from_categories(&merged, &template.product_types, template.version);
            prepare_for_save(&mut rebuilt);
            store.save_template(&rebuilt);
        }
    }
    assert_eq!(store.saved.len(), 1);
    assert_eq!(store.saved[0].categories[0].name, "Material (rev.2)");

    // 構造変更のない編集セッションでは保存されない
    gate.unlock(&Credential::Password("pw".into())).expect("解錠失敗");
    if gate.lock() {
        store.save_template(&template);
    }
    assert_eq!(store.saved.len(), 1);
}

#[test]
fn test_template_file_roundtrip_preserves_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("template.json");

    let mut template = default_template();
    // 並びを入れ替えてsort_orderを振り直してから保存
    template.categories.swap(0, 1);
    prepare_for_save(&mut template);
    store::save_template_file(&path, &template).expect("テンプレート保存失敗");

    let loaded = store::load_template_file(&path).expect("テンプレート読み込み失敗");
    assert_eq!(loaded.categories[0].id, template.categories[0].id);
    assert_eq!(loaded.version, template.version);
    assert_eq!(loaded.item_count(), template.item_count());
}
