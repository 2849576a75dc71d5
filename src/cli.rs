use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commissioning-report")]
#[command(about = "設備試運転レポート作成・点検チェックリスト管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レポートの概要を表示
    Show {
        /// レポートJSONファイル
        #[arg(required = true)]
        report: PathBuf,
    },

    /// レポートからHTML/PDFを生成
    Export {
        /// レポートJSONファイル
        #[arg(required = true)]
        report: PathBuf,

        /// 出力形式 (html/pdf/both)
        #[arg(short, long, default_value = "html")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ドキュメントタイトル（省略時はレポートのタイトル）
        #[arg(short, long)]
        title: Option<String>,
    },

    /// 項目に証拠写真を添付（フォルダ内の画像を順次正規化）
    Attach {
        /// レポートJSONファイル
        #[arg(required = true)]
        report: PathBuf,

        /// 対象項目のID
        #[arg(required = true)]
        item_id: String,

        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,
    },

    /// 編集モード（アクセスゲートを通過して対話編集）
    Edit {
        /// レポートJSONファイル
        #[arg(required = true)]
        report: PathBuf,
    },

    /// テンプレートの同期・シード・表示
    Template {
        /// ストアからテンプレートを取得してファイルに保存
        #[arg(long)]
        pull: bool,

        /// ファイルのテンプレートをストアに保存
        #[arg(long)]
        push: bool,

        /// ストアが空ならデフォルトテンプレートをシード
        #[arg(long)]
        seed: bool,

        /// テンプレートの内容を表示
        #[arg(long)]
        show: bool,

        /// テンプレートファイル（デフォルト: template.json）
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },

    /// ローカル点検キャッシュの管理
    Cache {
        /// キャッシュを削除（全ローカルデータのリセット）
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 設定を表示/編集
    Config {
        /// テンプレートストアのURLを設定
        #[arg(long)]
        set_store_url: Option<String>,

        /// ストアのAPIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 編集モードパスワードを設定（ダイジェストのみ保存）
        #[arg(long)]
        set_password: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Html,
    Pdf,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use html, pdf, or both", s)),
        }
    }
}
