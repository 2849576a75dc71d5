//! 製品リストコンポーネント
//!
//! 名称・型式・数量の表。行の増減も点検フィールドと同じ
//! デバウンス保存に乗る。

use commissioning_report_common::Product;
use leptos::prelude::*;

use crate::app::AppContext;

#[component]
pub fn ProductTable() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let row_count = move || ctx.report.with(|r| r.products.len());

    let on_add_row = move |_| {
        ctx.update_meta(|r| r.products.push(Product::default()));
    };

    view! {
        <section class="product-table">
            <h2>"製品リスト"</h2>
            <table>
                <thead>
                    <tr>
                        <th>"名称"</th>
                        <th>"型式"</th>
                        <th>"数量"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For each=move || 0..row_count() key=|i| *i children=move |i| view! { <ProductRow index=i /> } />
                </tbody>
            </table>
            <button class="btn btn-small" on:click=on_add_row>"+ 行を追加"</button>
        </section>
    }
}

#[component]
fn ProductRow(index: usize) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let field = move |f: fn(&Product) -> &String| {
        ctx.report
            .with(|r| r.products.get(index).map(|p| f(p).clone()).unwrap_or_default())
    };

    let on_remove = move |_| {
        ctx.update_meta(|r| {
            if index < r.products.len() {
                r.products.remove(index);
            }
        });
    };

    view! {
        <tr>
            <td>
                <input
                    prop:value=move || field(|p| &p.name)
                    on:input=move |ev| {
                        ctx.update_meta(|r| {
                            if let Some(p) = r.products.get_mut(index) {
                                p.name = event_target_value(&ev);
                            }
                        })
                    }
                />
            </td>
            <td>
                <input
                    prop:value=move || field(|p| &p.model_name)
                    on:input=move |ev| {
                        ctx.update_meta(|r| {
                            if let Some(p) = r.products.get_mut(index) {
                                p.model_name = event_target_value(&ev);
                            }
                        })
                    }
                />
            </td>
            <td>
                <input
                    prop:value=move || field(|p| &p.quantity)
                    on:input=move |ev| {
                        ctx.update_meta(|r| {
                            if let Some(p) = r.products.get_mut(index) {
                                p.quantity = event_target_value(&ev);
                            }
                        })
                    }
                />
            </td>
            <td>
                <button class="btn btn-small btn-danger" on:click=on_remove>"×"</button>
            </td>
        </tr>
    }
}
