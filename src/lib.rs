//! 設備試運転レポート作成・点検チェックリスト管理ツール

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod scanner;
pub mod store;
