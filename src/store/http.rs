//! テンプレートストアAPIクライアント（PostgREST互換）
//!
//! 共有テンプレートをカテゴリ・項目・設定の3テーブルとして読み書きする。
//! sort_orderは読み込み時に尊重し、保存時に振り直す。
//! 保存は削除→再挿入方式だが、項目IDは維持する（ローカルキャッシュの
//! キーが切れないこと、楽観的バージョン番号で競合を検出することが
//! オリジナル設計からの意図的な変更点）。

use crate::error::{ReportCliError, Result};
use commissioning_report_common::{
    check_version_conflict, TemplateCategory, TemplateData, TemplateItem,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

const PRODUCT_TYPES_KEY: &str = "product_types";
const VERSION_KEY: &str = "template_version";
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

pub struct HttpTemplateStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTemplateStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn get_rows<T: for<'de> Deserialize<'de>>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let resp = self.auth(self.client.get(self.url(table, query))).send().await?;
        if !resp.status().is_success() {
            return Err(ReportCliError::StoreApi(format!(
                "{} の取得に失敗: HTTP {}",
                table,
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    async fn delete_all(&self, table: &str) -> Result<()> {
        let resp = self
            .auth(self.client.delete(self.url(table, DELETE_GUARD)))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReportCliError::StoreApi(format!(
                "{} の削除に失敗: HTTP {}",
                table,
                resp.status()
            )));
        }
        Ok(())
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let resp = self
            .auth(self.client.post(self.url(table, "")))
            .header("Content-Type", "application/json")
            .json(rows)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReportCliError::StoreApi(format!(
                "{} への挿入に失敗: HTTP {}",
                table,
                resp.status()
            )));
        }
        Ok(())
    }

    async fn upsert_setting(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let resp = self
            .auth(self.client.post(self.url("template_settings", "")))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[SettingRow { key: key.to_string(), value }])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReportCliError::StoreApi(format!(
                "設定 {} の保存に失敗: HTTP {}",
                key,
                resp.status()
            )));
        }
        Ok(())
    }

    async fn load_settings(&self) -> Result<HashMap<String, serde_json::Value>> {
        let rows: Vec<SettingRow> = self.get_rows("template_settings", "select=key,value").await?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    /// テンプレート全体を読み込む
    pub async fn load_template(&self) -> Result<TemplateData> {
        let categories: Vec<CategoryRow> =
            self.get_rows("template_categories", "select=*&order=sort_order").await?;
        let items: Vec<ItemRow> =
            self.get_rows("template_items", "select=*&order=sort_order").await?;
        let settings = self.load_settings().await?;

        let product_types: Vec<String> = settings
            .get(PRODUCT_TYPES_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| {
                commissioning_report_common::DEFAULT_PRODUCT_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });
        let version = settings
            .get(VERSION_KEY)
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        // O(1)参照のためカテゴリIDで項目を事前グループ化
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
    pub async fn save_template(&self, template: &TemplateData, base_version: u64) -> Result<()> {
        let settings = self.load_settings().await?;
        let store_version = settings.get(VERSION_KEY).and_then(|v| v.as_u64()).unwrap_or(0);
        check_version_conflict(store_version, base_version)
            .map_err(|e| ReportCliError::StoreApi(e.to_string()))?;

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
}
