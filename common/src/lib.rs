//! Commissioning Report Common Library
//!
//! CLIとWeb(WASM)で共有される型とコアロジック:
//! - types: レポート/テンプレート/点検結果の型
//! - merge: テンプレート×ローカルキャッシュのマージエンジン
//! - cache: ローカル点検キャッシュ
//! - debounce: デバウンス書き込みスケジューラ
//! - gate: 編集モードのアクセスゲート
//! - media: 画像の正規化（縮小・JPEG再圧縮・Data URL化）
//! - template: シード・検証・競合判定
//! - history: 変更履歴レコード
//! - snapshot: エクスポート用スナップショット

pub mod cache;
pub mod debounce;
pub mod default_template;
pub mod error;
pub mod gate;
pub mod history;
#[cfg(feature = "media")]
pub mod media;
pub mod merge;
pub mod snapshot;
pub mod template;
pub mod types;

pub use cache::{InspectionCache, SizeCheck, STORAGE_KEY};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_MS};
pub use default_template::default_template;
pub use error::{Error, Result};
pub use gate::{hash_password, AccessGate, Credential, EditSession, GateConfig, Role};
pub use history::{diff_entries, ChangeType, ItemChange};
pub use merge::{build_report, extract_cache, merge, ReportMeta};
pub use snapshot::ReportSnapshot;
pub use template::{
    check_version_conflict, prepare_for_save, seed_if_empty, template_from_categories, validate,
};
pub use types::{
    Category, ChecklistItem, InspectionEntry, Product, ReportData, TemplateCategory, TemplateData,
    TemplateItem, COMMON_PRODUCT_TYPE, DEFAULT_PRODUCT_TYPES,
};
