use serde_json::Value;

use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{Audit, AuditList, ListOptions, PatchOperation};

/// State that launches a pending audit
pub const AUDIT_STATE_ONGOING: &str = "ONGOING";

impl WatcherClient {
    pub async fn create_audit(&self, audit: &Audit) -> Result<Audit> {
        self.post("/audits", audit).await
    }

    pub async fn get_audit(&self, id: &str) -> Result<Audit> {
        self.get(&format!("/audits/{}", path_segment(id))).await
    }

    pub async fn list_audits(&self, options: &ListOptions) -> Result<Vec<Audit>> {
        let list: AuditList = self
            .get(&format!("/audits{}", options.to_query_string()))
            .await?;
        Ok(list.audits)
    }

    /// Replace the given fields of an audit
    pub async fn update_audit<I, K>(&self, id: &str, updates: I) -> Result<Audit>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let ops = PatchOperation::replace_all(updates);
        self.patch(&format!("/audits/{}", path_segment(id)), &ops).await
    }

    pub async fn delete_audit(&self, id: &str) -> Result<()> {
        self.delete(&format!("/audits/{}", path_segment(id))).await
    }

    pub async fn start_audit(&self, id: &str) -> Result<Audit> {
        self.update_audit(id, [("state", Value::from(AUDIT_STATE_ONGOING))])
            .await
    }
}
