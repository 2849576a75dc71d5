//! 写真の取り込みコンポーネント
//!
//! 選択されたファイルを1枚ずつ順次正規化する（縮小→JPEG再圧縮→
//! Data URL）。1枚の失敗はスキップして残りを続行し、各ファイルの
//! 合間にイベントループへ制御を返してUIを固めない。
//!
//! 取り込み先は2系統ある。証拠写真（点検フィールド、デバウンス保存・
//! 履歴対象）と、編集モード専用の参考画像（テンプレート構造の一部）。

use commissioning_report_common::media::{self, NormalizeOptions};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use crate::app::AppContext;

#[component]
pub fn ImageUpload(
    cat_index: usize,
    item_index: usize,
    /// trueなら項目の参考画像（reference_images）を編集する
    #[prop(optional)]
    reference: bool,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (is_processing, set_is_processing) = signal(false);

    let images = move || {
        ctx.report.with(|r| {
            r.categories
                .get(cat_index)
                .and_then(|c| c.items.get(item_index))
                .map(|i| if reference { i.reference_images.clone() } else { i.images.clone() })
                .unwrap_or_default()
        })
    };

    let push_image = move |data_url: String| {
        if reference {
            ctx.report.update(|r| {
                if let Some(item) = r
                    .categories
                    .get_mut(cat_index)
                    .and_then(|c| c.items.get_mut(item_index))
                {
                    item.reference_images.push(data_url);
                }
            });
            ctx.mark_template_dirty();
        } else {
            ctx.update_item(cat_index, item_index, move |item| {
                item.images.push(data_url);
            });
        }
    };

    let remove_image = move |i: usize| {
        if reference {
            ctx.report.update(|r| {
                if let Some(item) = r
                    .categories
                    .get_mut(cat_index)
                    .and_then(|c| c.items.get_mut(item_index))
                {
                    if i < item.reference_images.len() {
                        item.reference_images.remove(i);
                    }
                }
            });
            ctx.mark_template_dirty();
        } else {
            ctx.update_item(cat_index, item_index, move |item| {
                if i < item.images.len() {
                    item.images.remove(i);
                }
            });
        }
    };

    let on_files_selected = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file_list) = input.files() else { return };

        let files: Vec<web_sys::File> =
            (0..file_list.length()).filter_map(|i| file_list.get(i)).collect();
        if files.is_empty() {
            return;
        }
        input.set_value("");

        set_is_processing.set(true);
        spawn_local(async move {
            let opts = NormalizeOptions::default();

            for file in files {
                let file_name = file.name();

                let existing = ctx.report.with_untracked(|r| {
                    r.categories
                        .get(cat_index)
                        .and_then(|c| c.items.get(item_index))
                        .map(|i| {
                            if reference { i.reference_images.len() } else { i.images.len() }
                        })
                        .unwrap_or(0)
                });
                if existing >= opts.max_images_per_item {
                    ctx.notifier
                        .error(format!("画像は1項目{}枚までです", opts.max_images_per_item));
                    break;
                }

                let file = gloo::file::File::from(file);
                match gloo::file::futures::read_as_bytes(&file).await {
                    Ok(bytes) => match media::normalize(&bytes, &opts) {
                        Ok(data_url) => push_image(data_url),
                        Err(e) => ctx.notifier.error(format!("{}: {}", file_name, e)),
                    },
                    Err(e) => ctx.notifier.error(format!("{}: 読み込みに失敗 ({})", file_name, e)),
                }

                // 次のファイルの前にUIへ制御を返す
                TimeoutFuture::new(0).await;
            }

            set_is_processing.set(false);
        });
    };

    view! {
        <div class="image-upload">
            <div class="image-list">
                <For
                    each=move || images().into_iter().enumerate().collect::<Vec<_>>()
                    key=|(i, _)| *i
                    children=move |(i, data_url)| {
                        view! {
                            <div class="image-thumb">
                                <img src=data_url />
                                <button
                                    class="btn btn-small btn-danger"
                                    on:click=move |_| remove_image(i)
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    }
                />
            </div>

            <label class="image-upload-button">
                {move || {
                    if is_processing.get() {
                        "画像を処理中..."
                    } else if reference {
                        "🖼 参考画像を追加"
                    } else {
                        "📷 写真を追加"
                    }
                }}
                <input
                    type="file"
                    accept="image/*"
                    multiple=true
                    disabled=is_processing
                    on:change=on_files_selected
                    style="display: none"
                />
            </label>
        </div>
    }
}
