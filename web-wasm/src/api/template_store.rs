//! テンプレートストアAPIクライアント（PostgREST互換、fetch版）
//!
//! CLI側のreqwestクライアントと同じワイヤプロトコルをweb-sysのfetchで
//! 実装する。カテゴリ・項目・設定の3テーブル構成、保存は削除→再挿入、
//! 楽観的バージョン番号で競合を検出する。項目IDは保存をまたいで
//! 維持される（ローカルキャッシュのキーを切らないため）。

use commissioning_report_common::{
    check_version_conflict, GateConfig, ItemChange, TemplateCategory, TemplateData, TemplateItem,
    DEFAULT_PRODUCT_TYPES,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const PRODUCT_TYPES_KEY: &str = "product_types";
const VERSION_KEY: &str = "template_version";
const PASSWORD_KEY: &str = "edit_password_sha256";
/// PostgRESTのDELETEは全行指定を拒むため、存在しないIDとの不一致条件で全削除する
const DELETE_GUARD: &str = "id=neq.00000000-0000-0000-0000-000000000000";

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRow {
    id: String,
    name: String,
    sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemRow {
    id: String,
    category_id: String,
    text: String,
    product_type: Option<String>,
    reference_images: Option<Vec<String>>,
    sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingRow {
    key: String,
    value: serde_json::Value,
}

#[derive(Clone)]
pub struct TemplateStore {
    base_url: String,
    api_key: String,
}

fn js_err(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

impl TemplateStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// ホストページのグローバル設定（STORE_URL / STORE_API_KEY）から構築する
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let base_url = js_sys::Reflect::get(&window, &JsValue::from_str("STORE_URL"))
            .ok()?
            .as_string()?;
        let api_key = js_sys::Reflect::get(&window, &JsValue::from_str("STORE_API_KEY"))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default();
        Some(Self::new(&base_url, &api_key))
    }

    fn url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    /// fetch共通処理
    async fn fetch(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        prefer: Option<&str>,
    ) -> Result<String, String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
        let headers = request.headers();
        headers.set("apikey", &self.api_key).map_err(js_err)?;
        headers
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .map_err(js_err)?;
        if body.is_some() {
            headers.set("Content-Type", "application/json").map_err(js_err)?;
        }
        if let Some(prefer) = prefer {
            headers.set("Prefer", prefer).map_err(js_err)?;
        }

        let window = web_sys::window().ok_or("windowが取得できません")?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let resp: Response = resp_value.dyn_into().map_err(js_err)?;

        if !resp.ok() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let text = JsFuture::from(resp.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok(text.as_string().unwrap_or_default())
    }

    async fn get_rows<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, String> {
        let text = self
            .fetch("GET", &self.url(table, query), None, None)
            .await
            .map_err(|e| format!("{} の取得に失敗: {}", table, e))?;
        serde_json::from_str(&text).map_err(|e| format!("{} の解析に失敗: {}", table, e))
    }

    async fn delete_all(&self, table: &str) -> Result<(), String> {
        self.fetch("DELETE", &self.url(table, DELETE_GUARD), None, None)
            .await
            .map(|_| ())
            .map_err(|e| format!("{} の削除に失敗: {}", table, e))
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), String> {
        if rows.is_empty() {
            return Ok(());
        }
        let body = serde_json::to_string(rows).map_err(|e| e.to_string())?;
        self.fetch("POST", &self.url(table, ""), Some(&body), None)
            .await
            .map(|_| ())
            .map_err(|e| format!("{} への挿入に失敗: {}", table, e))
    }

    async fn upsert_setting(&self, key: &str, value: serde_json::Value) -> Result<(), String> {
        let body = serde_json::to_string(&[SettingRow { key: key.to_string(), value }])
            .map_err(|e| e.to_string())?;
        self.fetch(
            "POST",
            &self.url("template_settings", ""),
            Some(&body),
            Some("resolution=merge-duplicates"),
        )
        .await
        .map(|_| ())
        .map_err(|e| format!("設定 {} の保存に失敗: {}", key, e))
    }

    async fn load_settings(&self) -> Result<HashMap<String, serde_json::Value>, String> {
        let rows: Vec<SettingRow> = self.get_rows("template_settings", "select=key,value").await?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    /// テンプレート全体を読み込む
    pub async fn load_template(&self) -> Result<TemplateData, String> {
        let categories: Vec<CategoryRow> =
            self.get_rows("template_categories", "select=*&order=sort_order").await?;
        let items: Vec<ItemRow> =
            self.get_rows("template_items", "select=*&order=sort_order").await?;
        let settings = self.load_settings().await?;

        let product_types: Vec<String> = settings
            .get(PRODUCT_TYPES_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| DEFAULT_PRODUCT_TYPES.iter().map(|s| s.to_string()).collect());
        let version = settings.get(VERSION_KEY).and_then(|v| v.as_u64()).unwrap_or(0);

        let mut items_by_category: HashMap<String, Vec<ItemRow>> = HashMap::new();
        for item in items {
            items_by_category.entry(item.category_id.clone()).or_default().push(item);
        }

        let categories = categories
            .into_iter()
            .map(|cat| TemplateCategory {
                items: items_by_category
                    .remove(&cat.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| TemplateItem {
                        id: item.id,
                        text: item.text,
                        product_type: item.product_type.unwrap_or_default(),
                        reference_images: item.reference_images.unwrap_or_default(),
                        sort_order: item.sort_order,
                    })
                    .collect(),
                id: cat.id,
                name: cat.name,
                sort_order: cat.sort_order,
            })
            .collect();

        Ok(TemplateData { categories, product_types, version })
    }

    /// テンプレート全体を保存する（削除→再挿入、バージョン検査付き）
    ///
    /// `base_version`は編集開始時点のバージョン。ストア側が進んでいれば
    /// 競合エラーを返し、何も書き込まない。
    pub async fn save_template(
        &self,
        template: &TemplateData,
        base_version: u64,
    ) -> Result<(), String> {
        let settings = self.load_settings().await?;
        let store_version = settings.get(VERSION_KEY).and_then(|v| v.as_u64()).unwrap_or(0);
        check_version_conflict(store_version, base_version).map_err(|e| e.to_string())?;

        // 項目 → カテゴリの順に消す（外部キー制約）
        self.delete_all("template_items").await?;
        self.delete_all("template_categories").await?;

        let category_rows: Vec<CategoryRow> = template
            .categories
            .iter()
            .map(|cat| CategoryRow {
                id: cat.id.clone(),
                name: cat.name.clone(),
                sort_order: cat.sort_order,
            })
            .collect();
        self.insert_rows("template_categories", &category_rows).await?;

        let item_rows: Vec<ItemRow> = template
            .categories
            .iter()
            .flat_map(|cat| {
                cat.items.iter().map(|item| ItemRow {
                    id: item.id.clone(),
                    category_id: cat.id.clone(),
                    text: item.text.clone(),
                    product_type: Some(item.product_type.clone()),
                    reference_images: Some(item.reference_images.clone()),
                    sort_order: item.sort_order,
                })
            })
            .collect();
        self.insert_rows("template_items", &item_rows).await?;

        self.upsert_setting(PRODUCT_TYPES_KEY, json!(template.product_types)).await?;
        self.upsert_setting(VERSION_KEY, json!(template.version)).await?;

        Ok(())
    }

    /// 編集モードのゲート設定を取得する
    ///
    /// パスワードダイジェストはストア設定で集中管理する。未設定なら
    /// パスワード方式は常に拒否される。
    pub async fn load_gate_config(&self) -> Result<GateConfig, String> {
        let settings = self.load_settings().await?;
        let password_sha256 = settings
            .get(PASSWORD_KEY)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Ok(GateConfig { password_sha256 })
    }

    /// 編集パスワードのダイジェストを保存する
    ///
    /// 平文はワイヤに乗せない。既存キーはupsertで上書きされる。
    pub async fn save_password_digest(&self, digest: &str) -> Result<(), String> {
        self.upsert_setting(PASSWORD_KEY, json!(digest)).await
    }

    /// 変更履歴をベストエフォートで記録する
    ///
    /// 失敗しても編集セッションは止めない（呼び出し側はログだけ出す）。
    pub async fn record_history(&self, changes: &[ItemChange]) -> Result<(), String> {
        if changes.is_empty() {
            return Ok(());
        }
        let body = serde_json::to_string(changes).map_err(|e| e.to_string())?;
        self.fetch("POST", &self.url("item_history", ""), Some(&body), None)
            .await
            .map(|_| ())
            .map_err(|e| format!("履歴の記録に失敗: {}", e))
    }
}
