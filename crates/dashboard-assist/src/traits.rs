use crate::app_search::AppRecord;
use async_trait::async_trait;
use dashboard_core::DashboardResult;

/// A model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> DashboardResult<String>;
}

/// Searches an app store catalogue.
#[async_trait]
pub trait AppSearch: Send + Sync {
    /// An empty query browses popular apps.
    async fn search(&self, query: &str) -> DashboardResult<Vec<AppRecord>>;
}
