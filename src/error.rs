use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportCliError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("項目が見つかりません: {0}")]
    ItemNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("テンプレートストアエラー: {0}")]
    StoreApi(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Common(#[from] commissioning_report_common::Error),
}

pub type Result<T> = std::result::Result<T, ReportCliError>;
