//! Resource Client
//!
//! Typed wrapper issuing authenticated REST calls for one resource type.
//! Holds no cache; every call goes to the server.

use super::query::{ListQuery, ListResult};
use super::registry::{get_resource, ResourceDef, TransitionDef};
use crate::api::{ApiClient, ApiError, ApiResult};
use serde_json::{json, Value};

/// Rows fetched for reference pickers (matches the size of the member and
/// vehicle dropdowns)
pub const LOOKUP_LIMIT: u32 = 1000;

/// A domain-specific state change ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub key: String,
    pub path: String,
    pub body: Value,
}

impl Transition {
    /// Build a transition request; status transitions need a target value
    pub fn from_def(def: &TransitionDef, target: Option<&str>) -> Option<Self> {
        let body = match (def.needs_target(), target) {
            (true, Some(status)) => json!({ "status": status }),
            (true, None) => return None,
            (false, _) => json!({}),
        };

        Some(Self {
            key: def.key.clone(),
            path: def.path.clone(),
            body,
        })
    }
}

/// Client for one resource collection
#[derive(Clone)]
pub struct ResourceClient {
    api: ApiClient,
    def: &'static ResourceDef,
}

impl ResourceClient {
    pub fn new(api: ApiClient, def: &'static ResourceDef) -> Self {
        Self { api, def }
    }

    pub fn for_key(api: ApiClient, key: &str) -> Option<Self> {
        get_resource(key).map(|def| Self::new(api, def))
    }

    pub fn def(&self) -> &'static ResourceDef {
        self.def
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn record_url(&self, id: &str) -> String {
        self.api.url(&format!("{}/{}", self.def.path, id))
    }

    /// Serialize a query into request parameters (empty values dropped)
    pub fn list_params(query: &ListQuery) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), query.page.to_string()),
            ("limit".to_string(), query.page_size.to_string()),
        ];

        let search = query.search_term.trim();
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }

        params.extend(
            query
                .filters
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k.clone(), v.trim().to_string())),
        );
        params
    }

    /// Fetch one page
    pub async fn list(&self, query: &ListQuery) -> ApiResult<ListResult> {
        let url = self
            .api
            .url_with_query(&self.def.path, &Self::list_params(query));
        let body = self.api.get(&url).await?;
        ListResult::from_response(&body, query.page_size)
            .ok_or_else(|| ApiError::Network("unexpected list response".to_string()))
    }

    pub async fn get(&self, id: &str) -> ApiResult<Value> {
        let body = self.api.get(&self.record_url(id)).await?;
        Ok(self.unwrap_record(body))
    }

    pub async fn create(&self, draft: &Value) -> ApiResult<Value> {
        tracing::info!("create {}", self.def.key);
        let body = self.api.post(&self.api.url(&self.def.path), draft).await?;
        Ok(self.unwrap_record(body))
    }

    pub async fn update(&self, id: &str, draft: &Value) -> ApiResult<Value> {
        tracing::info!("update {} {}", self.def.key, id);
        let body = self.api.put(&self.record_url(id), draft).await?;
        Ok(self.unwrap_record(body))
    }

    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        tracing::info!("delete {} {}", self.def.key, id);
        self.api.delete(&self.record_url(id)).await?;
        Ok(())
    }

    pub async fn transition(&self, id: &str, action: &Transition) -> ApiResult<Value> {
        tracing::info!("{} {} {}", action.key, self.def.key, id);
        let url = self.api.url(&format!("{}/{}/{}", self.def.path, id, action.path));
        let body = self.api.put(&url, &action.body).await?;
        Ok(self.unwrap_record(body))
    }

    /// Rows for a reference picker
    pub async fn lookup(&self, limit: u32) -> ApiResult<Vec<Value>> {
        let url = self
            .api
            .url_with_query(&self.def.path, &[("limit".to_string(), limit.to_string())]);
        let body = self.api.get(&url).await?;
        Ok(ListResult::from_response(&body, limit.max(1))
            .map(|r| r.rows)
            .unwrap_or_default())
    }

    /// Accept both a bare record and a `{data: record}` envelope
    fn unwrap_record(&self, body: Value) -> Value {
        if body.get(&self.def.id_field).is_some() {
            return body;
        }
        match body {
            Value::Object(mut map) if map.get("data").is_some_and(|d| d.is_object()) => {
                map.remove("data").unwrap_or(Value::Null)
            },
            other => other,
        }
    }
}
