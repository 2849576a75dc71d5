//! メインアプリケーションコンポーネント
//!
//! 起動シーケンスは同期キャッシュ読み込み → 非同期テンプレート取得
//! （順次、並行しない）→ 空ならシード → マージ → シグナル反映。
//! 以降の編集はシグナルを書き換え、デバウンス付きでlocalStorageへ
//! フラッシュする。アンマウント後に届いた結果は無視する。

use commissioning_report_common::{
    build_report, default_template, diff_entries, extract_cache, hash_password, prepare_for_save,
    seed_if_empty, template_from_categories, AccessGate, ChecklistItem, Credential, Debouncer,
    InspectionEntry, ItemChange, ReportData, ReportMeta, SizeCheck,
};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsValue;

use crate::api::template_store::TemplateStore;
use crate::components::{
    category_section::CategorySection, export_buttons::ExportButtons, header::Header,
    product_table::ProductTable, product_type_manager::ProductTypeManager,
    signature_pad::SignaturePad,
};
use crate::notify::{Notifier, ToastLayer};
use crate::storage;

fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

/// アプリ全体で共有する状態（contextで配布）
#[derive(Clone, Copy)]
pub struct AppContext {
    pub report: RwSignal<ReportData>,
    pub loading: RwSignal<bool>,
    pub edit_mode: RwSignal<bool>,
    pub template_version: RwSignal<u64>,
    pub notifier: Notifier,
    gate: StoredValue<AccessGate>,
    debouncer: StoredValue<Debouncer>,
    store: StoredValue<Option<TemplateStore>>,
    pending_history: StoredValue<Vec<ItemChange>>,
    /// アンマウント後の非同期結果を捨てるためのガード
    alive: StoredValue<bool>,
}

impl AppContext {
    fn new() -> Self {
        Self {
            report: RwSignal::new(ReportData::default()),
            loading: RwSignal::new(true),
            edit_mode: RwSignal::new(false),
            template_version: RwSignal::new(0),
            notifier: Notifier::new(),
            gate: StoredValue::new(AccessGate::default()),
            debouncer: StoredValue::new(Debouncer::default()),
            store: StoredValue::new(None),
            pending_history: StoredValue::new(Vec::new()),
            alive: StoredValue::new(true),
        }
    }

    /// ヘッダ・製品表・署名など、履歴対象外のフィールドを編集する
    pub fn update_meta(&self, f: impl FnOnce(&mut ReportData)) {
        self.report.update(f);
        self.mark_edited();
    }

    /// チェック項目の点検フィールドを編集し、変更履歴を積む
    pub fn update_item(&self, cat_index: usize, item_index: usize, f: impl FnOnce(&mut ChecklistItem)) {
        let mut changes = Vec::new();
        self.report.update(|r| {
            if let Some(item) = r
                .categories
                .get_mut(cat_index)
                .and_then(|c| c.items.get_mut(item_index))
            {
                let before = InspectionEntry::from_item(item);
                f(item);
                changes =
                    diff_entries(&item.id, &before, &InspectionEntry::from_item(item), &now_iso());
            }
        });
        if !changes.is_empty() {
            self.pending_history.update_value(|p| p.extend(changes));
        }
        self.mark_edited();
    }

    /// テンプレート構造の変更（編集モード中のみ意味を持つ）
    pub fn mark_template_dirty(&self) {
        self.gate.update_value(|g| g.mark_template_dirty());
    }

    /// 編集を記録し、デバウンス窓が閉じたらフラッシュする
    pub fn mark_edited(&self) {
        let delay = self.debouncer.with_value(|d| d.delay_ms());
        self.debouncer.update_value(|d| {
            d.record_edit(storage::now_ms());
        });

        let ctx = *self;
        spawn_local(async move {
            // 期限ちょうどのタイマー誤差を吸収する小さな余白
            TimeoutFuture::new(delay as u32 + 10).await;
            if !ctx.alive.get_value() {
                return;
            }
            let due = ctx.debouncer.update_value(|d| d.poll(storage::now_ms()));
            if due.is_some() {
                ctx.flush_cache();
            }
        });
    }

    /// 保留中の書き込みを即時フラッシュする
    pub fn flush_now(&self) {
        self.debouncer.update_value(|d| {
            d.flush_now();
        });
        self.flush_cache();
    }

    /// 現在のレポートからキャッシュを抽出してlocalStorageへ書く
    fn flush_cache(&self) {
        let report = self.report.get_untracked();
        let cache = extract_cache(&report.categories);

        match cache.size_check() {
            SizeCheck::NearLimit => self
                .notifier
                .info("ローカル保存のサイズが警告域です。画像を減らすと安全です"),
            SizeCheck::OverLimit => self
                .notifier
                .error("ローカル保存が上限を超えています。画像を削除してください"),
            SizeCheck::Ok => {}
        }

        if let Err(e) = storage::save_cache(&cache) {
            self.notifier.error(e);
        }
        if let Err(e) = storage::save_meta(&report) {
            self.notifier.error(e);
        }

        // 履歴はベストエフォート。失敗はコンソールに残すだけ
        let pending = self.pending_history.update_value(std::mem::take);
        if !pending.is_empty() {
            if let Some(store) = self.store.get_value() {
                spawn_local(async move {
                    if let Err(e) = store.record_history(&pending).await {
                        web_sys::console::warn_1(&JsValue::from_str(&e));
                    }
                });
            }
        }
    }

    /// パスワードを検証して編集モードに入る
    pub fn enter_edit_mode(&self, password: &str) {
        let result = self.gate.update_value(|g| {
            g.unlock(&Credential::Password(password.to_string())).map(|s| s.role())
        });
        match result {
            Ok(_) => {
                self.edit_mode.set(true);
                self.notifier.success("編集モードに入りました");
            }
            Err(e) => self.notifier.error(e.to_string()),
        }
    }

    /// 編集パスワードを変更する（編集モード中のみ）
    ///
    /// ダイジェストをストア設定に書き、成功したらゲートにも反映する。
    /// 現在の編集セッションは維持される。
    pub fn change_password(&self, new_password: &str) {
        if !self.gate.with_value(|g| g.can_edit()) {
            return;
        }
        if new_password.len() < 4 {
            self.notifier.error("パスワードは4文字以上にしてください");
            return;
        }

        let digest = hash_password(new_password);
        let ctx = *self;
        spawn_local(async move {
            let Some(store) = ctx.store.get_value() else {
                ctx.notifier.error("ストア未設定のためパスワードを変更できません");
                return;
            };
            match store.save_password_digest(&digest).await {
                Ok(()) => {
                    if ctx.alive.get_value() {
                        ctx.gate.update_value(|g| g.set_password_digest(digest.clone()));
                        ctx.notifier.success("編集パスワードを変更しました");
                    }
                }
                Err(e) => {
                    if ctx.alive.get_value() {
                        ctx.notifier.error(format!("パスワードの変更に失敗: {}", e));
                    }
                }
            }
        });
    }

    /// 編集モードを終了する
    ///
    /// テンプレート変更があればこの遷移でちょうど1回ストアへ保存する。
    pub fn exit_edit_mode(&self) {
        let dirty = self.gate.update_value(|g| g.lock());
        self.edit_mode.set(false);
        self.flush_now();

        if !dirty {
            self.notifier.info("編集モードを終了しました");
            return;
        }

        let ctx = *self;
        spawn_local(async move {
            let Some(store) = ctx.store.get_value() else {
                ctx.notifier.error("ストア未設定のためテンプレートを保存できません");
                return;
            };

            let report = ctx.report.get_untracked();
            let base_version = ctx.template_version.get_untracked();
            let mut template =
                template_from_categories(&report.categories, &report.product_types, base_version);
            prepare_for_save(&mut template);

            match store.save_template(&template, base_version).await {
                Ok(()) => {
                    if ctx.alive.get_value() {
                        ctx.template_version.set(template.version);
                        ctx.notifier.success("テンプレートを保存しました");
                    }
                }
                Err(e) => {
                    if ctx.alive.get_value() {
                        ctx.notifier.error(format!("テンプレートの保存に失敗: {}", e));
                    }
                }
            }
        });
    }
}

/// 起動シーケンス
async fn startup(ctx: AppContext) {
    let cache = storage::load_cache();
    let meta = storage::load_meta();

    let store = TemplateStore::from_window();
    ctx.store.set_value(store.clone());

    let template = match &store {
        Some(store) => match store.load_template().await {
            Ok(loaded) => match seed_if_empty(&loaded) {
                Some(seeded) => {
                    match store.save_template(&seeded, loaded.version).await {
                        Ok(()) => ctx.notifier.info("初期チェックリストを登録しました"),
                        Err(e) => ctx.notifier.error(format!("初期登録に失敗: {}", e)),
                    }
                    seeded
                }
                None => loaded,
            },
            Err(e) => {
                ctx.notifier
                    .error(format!("テンプレートの取得に失敗: {}（既定の内容で継続します）", e));
                default_template()
            }
        },
        None => {
            ctx.notifier.info("ストア未設定のためローカルのみで動作します");
            default_template()
        }
    };

    if let Some(store) = &store {
        if let Ok(config) = store.load_gate_config().await {
            ctx.gate.set_value(AccessGate::new(config));
        }
    }

    // アンマウント済みなら何も反映しない
    if !ctx.alive.get_value() {
        return;
    }

    ctx.template_version.set(template.version);
    let mut report = build_report(&template, &cache, &ReportMeta::default());
    meta.apply_to(&mut report);
    ctx.report.set(report);
    ctx.loading.set(false);
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    on_cleanup(move || ctx.alive.set_value(false));
    spawn_local(async move { startup(ctx).await });

    let category_count = move || ctx.report.with(|r| r.categories.len());

    view! {
        <div class="container">
            <Header />

            <Show
                when=move || !ctx.loading.get()
                fallback=|| view! { <p class="loading">"読み込み中..."</p> }
            >
                <ProductTable />

                <Show when=move || ctx.edit_mode.get()>
                    <ProductTypeManager />
                </Show>

                <For
                    each=move || 0..category_count()
                    key=|i| *i
                    children=move |i| view! { <CategorySection index=i /> }
                />

                <div class="signatures">
                    <SignaturePad
                        label="Commissioner"
                        field_id="sig-commissioner"
                        read=Signal::derive(move || {
                            ctx.report.with(|r| r.commissioner_signature.clone())
                        })
                        write=move |v: String| {
                            ctx.update_meta(|r| r.commissioner_signature = v.clone())
                        }
                    />
                    <SignaturePad
                        label="Installer"
                        field_id="sig-installer"
                        read=Signal::derive(move || {
                            ctx.report.with(|r| r.installer_signature.clone())
                        })
                        write=move |v: String| {
                            ctx.update_meta(|r| r.installer_signature = v.clone())
                        }
                    />
                    <SignaturePad
                        label="Customer"
                        field_id="sig-customer"
                        read=Signal::derive(move || {
                            ctx.report.with(|r| r.customer_signature.clone())
                        })
                        write=move |v: String| {
                            ctx.update_meta(|r| r.customer_signature = v.clone())
                        }
                    />
                </div>

                <ExportButtons />
            </Show>

            <ToastLayer notifier=ctx.notifier />
        </div>
    }
}
