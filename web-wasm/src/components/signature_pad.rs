//! 署名パッドコンポーネント
//!
//! 描画本体はJavaScript側（signature-pad.js）。確定ボタンで
//! Data URLを読み出してレポートに取り込む。

use leptos::prelude::*;

use crate::app::AppContext;
use crate::export::js_bindings;

#[component]
pub fn SignaturePad(
    label: &'static str,
    field_id: &'static str,
    read: Signal<String>,
    #[prop(into)] write: Callback<String>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    // DOM反映後にキャンバスを初期化する
    Effect::new(move |_| {
        js_bindings::init_signature_pad_js(field_id);
    });

    let on_confirm = move |_| match js_bindings::read_signature_js(field_id) {
        Some(data_url) => {
            write.run(data_url);
            ctx.notifier.success(format!("{} の署名を保存しました", label));
        }
        None => ctx.notifier.error("署名が記入されていません"),
    };

    let on_clear = move |_| {
        js_bindings::clear_signature_js(field_id);
        write.run(String::new());
    };

    view! {
        <div class="signature-pad">
            <p class="signature-label">
                {label}
                <Show when=move || !read.get().is_empty()>
                    <span class="signature-saved">" ✔"</span>
                </Show>
            </p>
            <canvas id=field_id class="signature-canvas" width="320" height="120"></canvas>
            <div class="signature-actions">
                <button class="btn btn-small" on:click=on_confirm>"確定"</button>
                <button class="btn btn-small btn-secondary" on:click=on_clear>"クリア"</button>
            </div>
        </div>
    }
}
