//! ヘッダコンポーネント
//!
//! レポートのヘッダ情報（タイトル・案件・住所・点検日）の入力と、
//! 編集モードの入退場を担う。

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::geocode;
use crate::app::AppContext;

#[component]
pub fn Header() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (password, set_password) = signal(String::new());
    let (show_gate, set_show_gate) = signal(false);

    let on_unlock = move |_| {
        ctx.enter_edit_mode(&password.get_untracked());
        set_password.set(String::new());
        set_show_gate.set(false);
    };

    let on_lock = move |_| {
        ctx.exit_edit_mode();
    };

    let (new_password, set_new_password) = signal(String::new());
    let on_change_password = move |_| {
        ctx.change_password(&new_password.get_untracked());
        set_new_password.set(String::new());
    };

    // 現在地 → 住所（失敗時は座標表示に格下げ）
    let on_locate = move |_| {
        spawn_local(async move {
            match geocode::current_position().await {
                Ok((lat, lon)) => {
                    let address = geocode::reverse_geocode(lat, lon).await;
                    ctx.update_meta(|r| r.address = address.clone());
                    ctx.notifier.success("現在地から住所を設定しました");
                }
                Err(e) => ctx.notifier.error(e),
            }
        });
    };

    view! {
        <header class="report-header">
            <input
                class="report-title"
                placeholder="レポートタイトル"
                prop:value=move || ctx.report.with(|r| r.title.clone())
                on:input=move |ev| ctx.update_meta(|r| r.title = event_target_value(&ev))
            />

            <div class="header-grid">
                <label>
                    "プロジェクト名"
                    <input
                        prop:value=move || ctx.report.with(|r| r.project_name.clone())
                        on:input=move |ev| {
                            ctx.update_meta(|r| r.project_name = event_target_value(&ev))
                        }
                    />
                </label>
                <label>
                    "案件番号"
                    <input
                        prop:value=move || ctx.report.with(|r| r.opportunity_number.clone())
                        on:input=move |ev| {
                            ctx.update_meta(|r| r.opportunity_number = event_target_value(&ev))
                        }
                    />
                </label>
                <label>
                    "住所"
                    <input
                        prop:value=move || ctx.report.with(|r| r.address.clone())
                        on:input=move |ev| {
                            ctx.update_meta(|r| r.address = event_target_value(&ev))
                        }
                    />
                    <button class="btn btn-small" on:click=on_locate>"現在地から取得"</button>
                </label>
                <label>
                    "点検日"
                    <input
                        type="date"
                        prop:value=move || ctx.report.with(|r| r.inspection_date.clone())
                        on:input=move |ev| {
                            ctx.update_meta(|r| r.inspection_date = event_target_value(&ev))
                        }
                    />
                </label>
            </div>

            <div class="gate-controls">
                <Show
                    when=move || ctx.edit_mode.get()
                    fallback=move || {
                        view! {
                            <Show
                                when=move || show_gate.get()
                                fallback=move || {
                                    view! {
                                        <button
                                            class="btn btn-secondary"
                                            on:click=move |_| set_show_gate.set(true)
                                        >
                                            "編集モード"
                                        </button>
                                    }
                                }
                            >
                                <input
                                    type="password"
                                    placeholder="パスワード"
                                    prop:value=password
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                />
                                <button class="btn btn-primary" on:click=on_unlock>"解除"</button>
                                <button
                                    class="btn btn-small"
                                    on:click=move |_| set_show_gate.set(false)
                                >
                                    "取消"
                                </button>
                            </Show>
                        }
                    }
                >
                    <span class="edit-badge">"編集モード中"</span>
                    <input
                        type="password"
                        placeholder="新しいパスワード"
                        prop:value=new_password
                        on:input=move |ev| set_new_password.set(event_target_value(&ev))
                    />
                    <button class="btn btn-small" on:click=on_change_password>
                        "パスワード変更"
                    </button>
                    <button class="btn btn-primary" on:click=on_lock>"編集を終了"</button>
                </Show>
            </div>
        </header>
    }
}
