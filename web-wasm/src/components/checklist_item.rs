//! チェックリスト項目コンポーネント
//!
//! OK/NGトグル（相互排他）・問題メモ・証拠写真。点検フィールドの
//! 変更はデバウンス付きでローカル保存される。項目文言・対象製品・
//! 並び替え・参考画像の変更はテンプレート構造の編集（編集モード中のみ）。

use commissioning_report_common::{ChecklistItem as Item, COMMON_PRODUCT_TYPE};
use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::image_upload::ImageUpload;

#[component]
pub fn ChecklistItemRow(cat_index: usize, item_index: usize) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let item_field = move |f: fn(&Item) -> String| {
        ctx.report.with(|r| {
            r.categories
                .get(cat_index)
                .and_then(|c| c.items.get(item_index))
                .map(f)
                .unwrap_or_default()
        })
    };
    let pass = move || {
        ctx.report.with(|r| {
            r.categories
                .get(cat_index)
                .and_then(|c| c.items.get(item_index))
                .map(|i| i.pass)
                .unwrap_or(false)
        })
    };
    let fail = move || {
        ctx.report.with(|r| {
            r.categories
                .get(cat_index)
                .and_then(|c| c.items.get(item_index))
                .map(|i| i.fail)
                .unwrap_or(false)
        })
    };

    // OKをもう一度押すと未判定に戻る。NGも同様
    let on_toggle_pass = move |_| {
        let current = pass();
        ctx.update_item(cat_index, item_index, move |item| item.set_pass(!current));
    };
    let on_toggle_fail = move |_| {
        let current = fail();
        ctx.update_item(cat_index, item_index, move |item| item.set_fail(!current));
    };

    let on_issue_input = move |ev| {
        let value = event_target_value(&ev);
        ctx.update_item(cat_index, item_index, move |item| item.issue = value);
    };

    let on_text_change = move |ev| {
        let value = event_target_value(&ev);
        ctx.report.update(|r| {
            if let Some(item) = r
                .categories
                .get_mut(cat_index)
                .and_then(|c| c.items.get_mut(item_index))
            {
                item.text = value;
            }
        });
        ctx.mark_template_dirty();
    };

    let on_remove_item = move |_| {
        ctx.report.update(|r| {
            if let Some(cat) = r.categories.get_mut(cat_index) {
                if item_index < cat.items.len() {
                    cat.items.remove(item_index);
                }
            }
        });
        ctx.mark_template_dirty();
    };

    // カテゴリ内での並び替え。端では何もしない
    let on_move_up = move |_| {
        if item_index == 0 {
            return;
        }
        ctx.report.update(|r| {
            if let Some(cat) = r.categories.get_mut(cat_index) {
                if item_index < cat.items.len() {
                    cat.items.swap(item_index - 1, item_index);
                }
            }
        });
        ctx.mark_template_dirty();
    };
    let on_move_down = move |_| {
        ctx.report.update(|r| {
            if let Some(cat) = r.categories.get_mut(cat_index) {
                if item_index + 1 < cat.items.len() {
                    cat.items.swap(item_index, item_index + 1);
                }
            }
        });
        ctx.mark_template_dirty();
    };

    let on_product_type_change = move |ev| {
        let value = event_target_value(&ev);
        ctx.report.update(|r| {
            if let Some(item) = r
                .categories
                .get_mut(cat_index)
                .and_then(|c| c.items.get_mut(item_index))
            {
                item.product_type = value;
            }
        });
        ctx.mark_template_dirty();
    };

    // 選択肢: 番兵値Common＋テンプレートの製品タイプ一覧
    let product_type_options = move || {
        ctx.report.with(|r| {
            let mut options = vec![COMMON_PRODUCT_TYPE.to_string()];
            options.extend(r.product_types.iter().cloned());
            options
        })
    };

    let reference_images = move || {
        ctx.report.with(|r| {
            r.categories
                .get(cat_index)
                .and_then(|c| c.items.get(item_index))
                .map(|i| i.reference_images.clone())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="checklist-item">
            <div class="item-row">
                <div class="item-verdict">
                    <button
                        class=move || if pass() { "btn btn-ok active" } else { "btn btn-ok" }
                        on:click=on_toggle_pass
                    >
                        "OK"
                    </button>
                    <button
                        class=move || if fail() { "btn btn-ng active" } else { "btn btn-ng" }
                        on:click=on_toggle_fail
                    >
                        "NG"
                    </button>
                </div>

                <div class="item-body">
                    <Show
                        when=move || ctx.edit_mode.get()
                        fallback=move || {
                            view! {
                                <p class="item-text">
                                    {move || item_field(|i| i.text.clone())}
                                    <span class="item-product-type">
                                        {move || format!("[{}]", item_field(|i| i.product_type.clone()))}
                                    </span>
                                </p>
                            }
                        }
                    >
                        <input
                            class="item-text-input"
                            prop:value=move || item_field(|i| i.text.clone())
                            on:change=on_text_change
                        />
                        <select class="item-product-select" on:change=on_product_type_change>
                            <For
                                each=product_type_options
                                key=|t| t.clone()
                                children=move |t| {
                                    let value = t.clone();
                                    let is_current = {
                                        let value = value.clone();
                                        move || item_field(|i| i.product_type.clone()) == value
                                    };
                                    view! {
                                        <option value=value.clone() selected=is_current>{t}</option>
                                    }
                                }
                            />
                        </select>
                        <button class="btn btn-small" on:click=on_move_up>"↑"</button>
                        <button class="btn btn-small" on:click=on_move_down>"↓"</button>
                        <button class="btn btn-small btn-danger" on:click=on_remove_item>
                            "項目を削除"
                        </button>
                    </Show>

                    <textarea
                        class="item-issue"
                        placeholder="問題・備考"
                        prop:value=move || item_field(|i| i.issue.clone())
                        on:input=on_issue_input
                    ></textarea>
                </div>
            </div>

            <Show
                when=move || ctx.edit_mode.get()
                fallback=move || {
                    view! {
                        <Show when=move || !reference_images().is_empty()>
                            <div class="reference-images">
                                <For
                                    each=reference_images
                                    key=|url| url.clone()
                                    children=move |url| {
                                        view! { <img class="reference-image" src=url /> }
                                    }
                                />
                            </div>
                        </Show>
                    }
                }
            >
                <ImageUpload cat_index=cat_index item_index=item_index reference=true />
            </Show>

            <ImageUpload cat_index=cat_index item_index=item_index />
        </div>
    }
}
