//! カテゴリセクションコンポーネント
//!
//! カテゴリ名・項目の増減・並び替えはテンプレート構造の変更にあたるため
//! 編集モード中のみ許可し、ゲートにdirtyを記録する。構造変更は
//! 編集モード終了時にまとめてストアへ保存される。

use commissioning_report_common::{ChecklistItem as Item, COMMON_PRODUCT_TYPE};
use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::checklist_item::ChecklistItemRow;

fn new_item_id() -> String {
    format!("item-{}", js_sys::Date::now() as u64)
}

#[component]
pub fn CategorySection(index: usize) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let name = move || {
        ctx.report
            .with(|r| r.categories.get(index).map(|c| c.name.clone()).unwrap_or_default())
    };
    let item_count = move || {
        ctx.report
            .with(|r| r.categories.get(index).map(|c| c.items.len()).unwrap_or(0))
    };

    let on_rename = move |ev| {
        let value = event_target_value(&ev);
        ctx.report.update(|r| {
            if let Some(cat) = r.categories.get_mut(index) {
                cat.name = value;
            }
        });
        ctx.mark_template_dirty();
    };

    let on_add_item = move |_| {
        ctx.report.update(|r| {
            if let Some(cat) = r.categories.get_mut(index) {
                cat.items.push(Item {
                    id: new_item_id(),
                    product_type: COMMON_PRODUCT_TYPE.to_string(),
                    ..Default::default()
                });
            }
        });
        ctx.mark_template_dirty();
    };

    let on_remove_category = move |_| {
        ctx.report.update(|r| {
            if index < r.categories.len() {
                r.categories.remove(index);
            }
        });
        ctx.mark_template_dirty();
    };

    // 並び替え: 隣と入れ替える。端では何もしない
    let on_move_up = move |_| {
        if index == 0 {
            return;
        }
        ctx.report.update(|r| {
            if index < r.categories.len() {
                r.categories.swap(index - 1, index);
            }
        });
        ctx.mark_template_dirty();
    };
    let on_move_down = move |_| {
        ctx.report.update(|r| {
            if index + 1 < r.categories.len() {
                r.categories.swap(index, index + 1);
            }
        });
        ctx.mark_template_dirty();
    };

    view! {
        <section class="category-section">
            <div class="category-header">
                <Show
                    when=move || ctx.edit_mode.get()
                    fallback=move || view! { <h2>{name()}</h2> }
                >
                    <input class="category-name" prop:value=name on:change=on_rename />
                    <button class="btn btn-small" on:click=on_move_up>"↑"</button>
                    <button class="btn btn-small" on:click=on_move_down>"↓"</button>
                    <button class="btn btn-small btn-danger" on:click=on_remove_category>
                        "カテゴリを削除"
                    </button>
                </Show>
            </div>

            <For
                each=move || 0..item_count()
                key=|i| *i
                children=move |i| view! { <ChecklistItemRow cat_index=index item_index=i /> }
            />

            <Show when=move || ctx.edit_mode.get()>
                <button class="btn btn-small" on:click=on_add_item>"+ 項目を追加"</button>
            </Show>
        </section>
    }
}
