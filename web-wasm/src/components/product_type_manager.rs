//! 製品タイプ一覧の管理コンポーネント（編集モード専用）
//!
//! 項目の対象製品セレクトに出る選択肢を増減する。一覧の変更は
//! テンプレート構造の変更として扱い、編集モード終了時に保存される。

use leptos::prelude::*;

use crate::app::AppContext;

#[component]
pub fn ProductTypeManager() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (new_type, set_new_type) = signal(String::new());

    let types = move || ctx.report.with(|r| r.product_types.clone());

    let on_add = move |_| {
        let value = new_type.get_untracked().trim().to_string();
        if value.is_empty() {
            return;
        }
        let duplicate = ctx.report.with_untracked(|r| r.product_types.contains(&value));
        if duplicate {
            ctx.notifier.info(format!("製品タイプ {} は登録済みです", value));
            return;
        }
        ctx.report.update(|r| r.product_types.push(value));
        ctx.mark_template_dirty();
        set_new_type.set(String::new());
    };

    let on_remove = move |name: String| {
        ctx.report.update(|r| r.product_types.retain(|t| t != &name));
        ctx.mark_template_dirty();
    };

    view! {
        <section class="product-type-manager">
            <h3>"製品タイプ"</h3>
            <div class="product-type-list">
                <For
                    each=types
                    key=|t| t.clone()
                    children=move |t| {
                        let name = t.clone();
                        view! {
                            <span class="product-type-chip">
                                {t}
                                <button
                                    class="btn btn-small btn-danger"
                                    on:click=move |_| on_remove(name.clone())
                                >
                                    "×"
                                </button>
                            </span>
                        }
                    }
                />
            </div>
            <div class="product-type-add">
                <input
                    placeholder="新しい製品タイプ"
                    prop:value=new_type
                    on:input=move |ev| set_new_type.set(event_target_value(&ev))
                />
                <button class="btn btn-small" on:click=on_add>"追加"</button>
            </div>
        </section>
    }
}
