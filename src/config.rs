use crate::error::{ReportCliError, Result};
use commissioning_report_common::gate::hash_password;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// テンプレートストアのベースURL（PostgREST互換）
    pub store_url: Option<String>,
    /// ストアのAPIキー
    pub api_key: Option<String>,
    /// 編集モードパスワードのSHA-256ダイジェスト（平文は保存しない）
    pub password_sha256: Option<String>,
    pub max_image_dimension: u32,
    pub jpeg_quality: u8,
    pub debounce_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportCliError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("commissioning-report").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            store_url: None,
            api_key: None,
            password_sha256: None,
            max_image_dimension: 1280,
            jpeg_quality: 80,
            debounce_ms: 500,
        }
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        self.password_sha256 = Some(hash_password(password));
        self.save()
    }

    pub fn store_url(&self) -> Result<&str> {
        self.store_url
            .as_deref()
            .ok_or_else(|| ReportCliError::Config(
                "ストアURLが未設定です。`commissioning-report config --set-store-url URL` で設定してください".into(),
            ))
    }
}
