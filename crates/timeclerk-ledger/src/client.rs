//! HTTP Ledger client
//!
//! Speaks the Airtable-compatible REST dialect: GET with
//! `filterByFormula`, POST/PATCH with a `fields` body, bearer auth.
//! Every call carries the configured timeout; upstream failures are
//! surfaced with status and body for operator diagnosis.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use timeclerk_config::LedgerConfig;
use timeclerk_util::{RecordId, Result, TimeclerkError};
use tracing::debug;

use crate::{Fields, Ledger, ListQuery, Record};

/// Ledger client over HTTP
pub struct HttpLedger {
    http: Client,
    api_url: String,
    base_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<Record>,
}

impl HttpLedger {
    pub fn new(config: &LedgerConfig, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| TimeclerkError::config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            base_id: config.base_id.clone(),
            token: token.into(),
        })
    }

    fn table_url(&self, table: &str, record: Option<&RecordId>) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| TimeclerkError::config(format!("Ledger api_url: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TimeclerkError::config("Ledger api_url cannot be a base URL")
            })?;
            segments.push(&self.base_id);
            segments.push(table);
            if let Some(id) = record {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn send_json(&self, method: Method, url: Url, body: Option<&Fields>) -> Result<Record> {
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.token);
        if let Some(fields) = body {
            req = req.json(&serde_json::json!({ "fields": fields }));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TimeclerkError::upstream(None, format!("Ledger request: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TimeclerkError::upstream(Some(status.as_u16()), e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(TimeclerkError::not_found("Ledger record not found"));
        }
        if !status.is_success() {
            return Err(TimeclerkError::upstream(Some(status.as_u16()), text));
        }

        serde_json::from_str(&text).map_err(|e| {
            TimeclerkError::upstream(
                Some(status.as_u16()),
                format!("unexpected Ledger response shape: {}", e),
            )
        })
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Record>> {
        let mut url = self.table_url(table, None)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(filter) = &query.filter {
                let formula = filter.to_formula();
                debug!(table, formula = %formula, "Ledger list");
                pairs.append_pair("filterByFormula", &formula);
            }
            if let Some(max) = query.max_records {
                pairs.append_pair("maxRecords", &max.to_string());
            }
            if let Some((field, dir)) = &query.sort {
                pairs.append_pair("sort[0][field]", field);
                pairs.append_pair("sort[0][direction]", dir.as_str());
            }
        }

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| TimeclerkError::upstream(None, format!("Ledger request: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TimeclerkError::upstream(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(TimeclerkError::upstream(Some(status.as_u16()), text));
        }

        let parsed: ListResponse = serde_json::from_str(&text).map_err(|e| {
            TimeclerkError::upstream(
                Some(status.as_u16()),
                format!("unexpected Ledger response shape: {}", e),
            )
        })?;
        Ok(parsed.records)
    }

    async fn get(&self, table: &str, id: &RecordId) -> Result<Record> {
        let url = self.table_url(table, Some(id))?;
        self.send_json(Method::GET, url, None).await
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record> {
        let url = self.table_url(table, None)?;
        self.send_json(Method::POST, url, Some(&fields)).await
    }

    async fn patch(&self, table: &str, id: &RecordId, fields: Fields) -> Result<Record> {
        let url = self.table_url(table, Some(id))?;
        self.send_json(Method::PATCH, url, Some(&fields)).await
    }
}
