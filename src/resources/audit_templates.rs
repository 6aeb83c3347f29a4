use serde_json::Value;

use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{AuditTemplate, AuditTemplateList, ListOptions, PatchOperation};

impl WatcherClient {
    pub async fn create_audit_template(&self, template: &AuditTemplate) -> Result<AuditTemplate> {
        self.post("/audit_templates", template).await
    }

    /// Look up a template by UUID or name
    pub async fn get_audit_template(&self, id: &str) -> Result<AuditTemplate> {
        self.get(&format!("/audit_templates/{}", path_segment(id))).await
    }

    pub async fn list_audit_templates(&self, options: &ListOptions) -> Result<Vec<AuditTemplate>> {
        let list: AuditTemplateList = self
            .get(&format!("/audit_templates{}", options.to_query_string()))
            .await?;
        Ok(list.audit_templates)
    }

    pub async fn update_audit_template<I, K>(&self, id: &str, updates: I) -> Result<AuditTemplate>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let ops = PatchOperation::replace_all(updates);
        self.patch(&format!("/audit_templates/{}", path_segment(id)), &ops).await
    }

    pub async fn delete_audit_template(&self, id: &str) -> Result<()> {
        self.delete(&format!("/audit_templates/{}", path_segment(id))).await
    }
}
