//! HTTP data source for the dashboard.
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{decode_list, decode_tickets, list_items, Branch, BranchRevenueRow, TicketRecord};
use crate::config::ApiConfig;
use crate::error::AppError;

/// Read-only data source behind the dashboard, one method per consumed
/// endpoint. The coordinator only sees this trait, so tests drive it with
/// an in-memory implementation.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Ticket listing, optionally scoped server-side to one branch.
    async fn fetch_tickets(
        &self,
        branch: Option<i64>,
        page_size: u32,
    ) -> Result<Vec<TicketRecord>, AppError>;

    /// Branch records for the selector.
    async fn fetch_branches(&self) -> Result<Vec<Branch>, AppError>;

    /// Per-branch revenue rows for one month/year.
    async fn fetch_revenue(&self, year: i32, month: u32)
        -> Result<Vec<BranchRevenueRow>, AppError>;

    /// Headline counts; only the collection lengths are consumed.
    async fn customer_count(&self) -> Result<usize, AppError>;
    async fn product_count(&self) -> Result<usize, AppError>;
    async fn agent_count(&self) -> Result<usize, AppError>;

    /// Activity feed items, newest first. Passed through untyped; the
    /// coordinator only truncates them to a display count.
    async fn fetch_activities(&self) -> Result<Vec<Value>, AppError>;
}

/// `DashboardApi` implementation over the admin REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "dashboard api request");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    async fn collection_len(&self, path: &str) -> Result<usize, AppError> {
        let payload = self.get_json(path, &[]).await?;
        Ok(list_items(payload).len())
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn fetch_tickets(
        &self,
        branch: Option<i64>,
        page_size: u32,
    ) -> Result<Vec<TicketRecord>, AppError> {
        let mut query = vec![("limit", page_size.to_string())];
        if let Some(branch_id) = branch {
            query.push(("branch_id", branch_id.to_string()));
        }
        let payload = self.get_json("/tickets", &query).await?;
        let (tickets, skipped) = decode_tickets(payload);
        if skipped > 0 {
            tracing::warn!(skipped, kept = tickets.len(), "ticket payload contained malformed rows");
        }
        Ok(tickets)
    }

    async fn fetch_branches(&self) -> Result<Vec<Branch>, AppError> {
        decode_list(self.get_json("/branches", &[]).await?)
    }

    async fn fetch_revenue(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<BranchRevenueRow>, AppError> {
        let query = [("year", year.to_string()), ("month", month.to_string())];
        decode_list(self.get_json("/revenue", &query).await?)
    }

    async fn customer_count(&self) -> Result<usize, AppError> {
        self.collection_len("/customers").await
    }

    async fn product_count(&self) -> Result<usize, AppError> {
        self.collection_len("/products").await
    }

    async fn agent_count(&self) -> Result<usize, AppError> {
        self.collection_len("/agents").await
    }

    async fn fetch_activities(&self) -> Result<Vec<Value>, AppError> {
        Ok(list_items(self.get_json("/activities", &[]).await?))
    }
}
