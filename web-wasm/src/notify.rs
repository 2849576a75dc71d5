//! トースト通知
//!
//! 状態を変えるすべての操作は成功・失敗をここで通知する。
//! 失敗をunhandled rejectionのまま外へ漏らさないための出口。

use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const TOAST_DURATION_MS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// 通知ハブ。contextで配布してどのコンポーネントからも呼べるようにする
#[derive(Clone, Copy)]
pub struct Notifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn toasts(&self) -> ReadSignal<Vec<Toast>> {
        self.toasts.read_only()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|list| list.retain(|t| t.id != id));
    }

    fn push(&self, kind: ToastKind, message: String) {
        let id = self.next_id.try_update_value(|n| {
            *n += 1;
            *n
        });
        let Some(id) = id else { return };

        self.toasts.update(|list| list.push(Toast { id, kind, message }));

        // 一定時間後に自動で消す
        let notifier = *self;
        spawn_local(async move {
            TimeoutFuture::new(TOAST_DURATION_MS).await;
            notifier.dismiss(id);
        });
    }
}

/// トースト表示レイヤ
#[component]
pub fn ToastLayer(notifier: Notifier) -> impl IntoView {
    let toasts = notifier.toasts();
    view! {
        <div class="toast-layer">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast.kind.class() on:click=move |_| notifier.dismiss(id)>
                            {toast.message.clone()}
                        </div>
                    }
                }
            />
        </div>
    }
}
