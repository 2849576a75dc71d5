//! エクスポートボタンコンポーネント

use commissioning_report_common::ReportSnapshot;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::app::AppContext;
use crate::export::js_bindings;
use crate::storage;

#[component]
pub fn ExportButtons() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (is_exporting, set_is_exporting) = signal(false);

    let on_export_pdf = move |_| {
        if is_exporting.get_untracked() {
            return;
        }
        set_is_exporting.set(true);

        spawn_local(async move {
            let snapshot = ReportSnapshot::capture(&ctx.report.get_untracked());
            let result = async {
                let json = js_bindings::snapshot_to_json(&snapshot)?;
                let value = js_bindings::generate_report_pdf_js(&json)
                    .await
                    .map_err(|e| format!("PDF生成に失敗: {:?}", e))?;
                let bytes = js_sys::Uint8Array::new(&value).to_vec();
                js_bindings::download_pdf_js(&bytes, "commissioning-report.pdf");
                Ok::<(), String>(())
            }
            .await;

            match result {
                Ok(()) => ctx.notifier.success("PDFを出力しました"),
                Err(e) => ctx.notifier.error(e),
            }
            set_is_exporting.set(false);
        });
    };

    let on_print = move |_| {
        if let Some(window) = web_sys::window() {
            let _ = window.print();
        }
    };

    let on_clear_local = move |_| {
        let confirmed = web_sys::window()
            .and_then(|w| {
                w.confirm_with_message("ローカルの点検データをすべて削除します。よろしいですか？")
                    .ok()
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        storage::clear_all();
        ctx.report.update(|r| {
            for cat in &mut r.categories {
                for item in &mut cat.items {
                    item.pass = false;
                    item.fail = false;
                    item.issue.clear();
                    item.images.clear();
                }
            }
        });
        ctx.notifier.success("ローカルデータを消去しました");
    };

    view! {
        <div class="export-buttons">
            <button class="btn btn-primary" disabled=is_exporting on:click=on_export_pdf>
                {move || if is_exporting.get() { "PDF生成中..." } else { "PDF出力" }}
            </button>

            <button class="btn btn-secondary" on:click=on_print>
                "印刷"
            </button>

            <button class="btn btn-danger" on:click=on_clear_local>
                "ローカルデータを消去"
            </button>
        </div>
    }
}
