//! アクセスゲート
//!
//! 編集モード（テンプレート編集＋点検結果編集）への入場を判定する
//! 状態機械。ロール認証とパスワード認証の両方式に対応する。
//!
//! `Locked → unlock(credential) → {Unlocked | Locked+エラー}`
//! `Unlocked → lock() → Locked`（この遷移でテンプレート書き戻しが走る）
//!
//! パスワードは平文では保持せずSHA-256ダイジェストで比較する。
//! 能力はEditSessionトークンとして明示的に受け渡す（ambient globalなし）。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 認証プロバイダから得られるロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
    #[default]
    None,
}

impl Role {
    /// 編集モードに入れるロールか
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }

    /// 管理画面（テンプレート管理）を表示できるか
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// ゲートに提示する資格情報
#[derive(Debug, Clone)]
pub enum Credential {
    /// 共有パスワード方式
    Password(String),
    /// 認証済みアイデンティティのロール方式
    Role(Role),
}

/// 編集セッション（能力トークン）
///
/// Unlocked状態の証明としてUIに受け渡す。lock()で破棄される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    role: Role,
}

impl EditSession {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can_manage(&self) -> bool {
        self.role.can_manage()
    }
}

/// ゲート解除の検証設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// 共有パスワードのSHA-256ダイジェスト（hex）。未設定ならパスワード方式は拒否
    pub password_sha256: Option<String>,
}

impl GateConfig {
    pub fn with_password(password: &str) -> Self {
        Self { password_sha256: Some(hash_password(password)) }
    }
}

/// パスワードのSHA-256ダイジェスト（hex）
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// アクセスゲート状態機械
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
    session: Option<EditSession>,
    /// Unlocked中にテンプレートが変更されたか（lock時の書き戻し判定）
    template_dirty: bool,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config, session: None, template_dirty: false }
    }

    /// 現在編集可能か
    pub fn can_edit(&self) -> bool {
        self.session.is_some()
    }

    /// 現在のセッション（能力トークン）
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// 資格情報を検証して編集モードに入る
    ///
    /// 失敗時は状態を一切変更しない。
    pub fn unlock(&mut self, credential: &Credential) -> Result<&EditSession> {
        let role = match credential {
            Credential::Password(password) => {
                let expected = self
                    .config
                    .password_sha256
                    .as_deref()
                    .ok_or_else(|| Error::AccessDenied("パスワードが設定されていません".into()))?;
                if hash_password(password) != expected {
                    return Err(Error::AccessDenied("パスワードが一致しません".into()));
                }
                Role::Editor
            }
            Credential::Role(role) => {
                if !role.can_edit() {
                    return Err(Error::AccessDenied(format!("ロールに編集権限がありません: {:?}", role)));
                }
                *role
            }
        };

        self.template_dirty = false;
        Ok(&*self.session.insert(EditSession { role }))
    }

    /// 共有パスワードのダイジェストを差し替える
    ///
    /// 編集モード中の操作としてのみ有効。Locked中の呼び出しは無視する。
    /// 現在のセッションは維持される（再ログイン不要）。
    pub fn set_password_digest(&mut self, digest: String) {
        if self.session.is_some() {
            self.config.password_sha256 = Some(digest);
        }
    }

    /// Unlocked中のテンプレート変更を記録する
    pub fn mark_template_dirty(&mut self) {
        if self.session.is_some() {
            self.template_dirty = true;
        }
    }

    /// 編集モードを明示的に終了する
    ///
    /// 戻り値がtrueならこの遷移でテンプレートの書き戻しを行うこと。
    pub fn lock(&mut self) -> bool {
        let dirty = self.template_dirty && self.session.is_some();
        self.session = None;
        self.template_dirty = false;
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password_stays_locked() {
        let mut gate = AccessGate::new(GateConfig::with_password("correct"));
        let result = gate.unlock(&Credential::Password("wrong".into()));
        assert!(result.is_err());
        assert!(!gate.can_edit());
    }

    #[test]
    fn test_right_password_unlocks() {
        let mut gate = AccessGate::new(GateConfig::with_password("correct"));
        let session = gate.unlock(&Credential::Password("correct".into())).expect("unlock failed");
        assert_eq!(session.role(), Role::Editor);
        assert!(gate.can_edit());
    }

    #[test]
    fn test_no_password_configured_rejects() {
        let mut gate = AccessGate::new(GateConfig::default());
        assert!(gate.unlock(&Credential::Password("anything".into())).is_err());
        assert!(!gate.can_edit());
    }

    #[test]
    fn test_viewer_role_rejected() {
        let mut gate = AccessGate::new(GateConfig::default());
        assert!(gate.unlock(&Credential::Role(Role::Viewer)).is_err());
        assert!(gate.unlock(&Credential::Role(Role::None)).is_err());
        assert!(!gate.can_edit());
    }

    #[test]
    fn test_admin_role_unlocks_and_manages() {
        let mut gate = AccessGate::new(GateConfig::default());
        let session = gate.unlock(&Credential::Role(Role::Admin)).expect("unlock failed");
        assert!(session.can_manage());
    }

    #[test]
    fn test_lock_reports_template_writeback() {
        let mut gate = AccessGate::new(GateConfig::with_password("pw"));
        gate.unlock(&Credential::Password("pw".into())).expect("unlock failed");

        // 変更なしで終了 → 書き戻し不要
        assert!(!gate.lock());

        gate.unlock(&Credential::Password("pw".into())).expect("unlock failed");
        gate.mark_template_dirty();
        // 変更ありで終了 → この遷移でちょうど1回書き戻す
        assert!(gate.lock());
        assert!(!gate.can_edit());
        // 再lockしても書き戻しは要求されない
        assert!(!gate.lock());
    }

    #[test]
    fn test_password_change_requires_unlock() {
        let mut gate = AccessGate::new(GateConfig::with_password("old"));

        // Locked中の変更は無視される
        gate.set_password_digest(hash_password("new"));
        assert!(gate.unlock(&Credential::Password("new".into())).is_err());

        gate.unlock(&Credential::Password("old".into())).expect("unlock failed");
        gate.set_password_digest(hash_password("new"));
        assert!(gate.can_edit());
        gate.lock();

        // 以後は新パスワードのみ通る
        assert!(gate.unlock(&Credential::Password("old".into())).is_err());
        assert!(gate.unlock(&Credential::Password("new".into())).is_ok());
    }

    #[test]
    fn test_dirty_ignored_while_locked() {
        let mut gate = AccessGate::new(GateConfig::with_password("pw"));
        gate.mark_template_dirty();
        assert!(!gate.lock());
    }

    #[test]
    fn test_hash_password_stable() {
        assert_eq!(hash_password("abc"), hash_password("abc"));
        assert_ne!(hash_password("abc"), hash_password("abd"));
        // hex形式の64文字
        assert_eq!(hash_password("abc").len(), 64);
    }
}
