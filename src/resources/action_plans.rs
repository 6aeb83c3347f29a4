use serde_json::Value;

use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{ActionPlan, ActionPlanList, ListOptions, PatchOperation};

/// State that asks the applier to execute a plan
pub const ACTION_PLAN_STATE_TRIGGERED: &str = "TRIGGERED";
pub const ACTION_PLAN_STATE_CANCELLED: &str = "CANCELLED";

impl WatcherClient {
    pub async fn get_action_plan(&self, id: &str) -> Result<ActionPlan> {
        self.get(&format!("/action_plans/{}", path_segment(id))).await
    }

    pub async fn list_action_plans(&self, options: &ListOptions) -> Result<Vec<ActionPlan>> {
        let list: ActionPlanList = self
            .get(&format!("/action_plans{}", options.to_query_string()))
            .await?;
        Ok(list.action_plans)
    }

    pub async fn update_action_plan<I, K>(&self, id: &str, updates: I) -> Result<ActionPlan>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let ops = PatchOperation::replace_all(updates);
        self.patch(&format!("/action_plans/{}", path_segment(id)), &ops).await
    }

    pub async fn delete_action_plan(&self, id: &str) -> Result<()> {
        self.delete(&format!("/action_plans/{}", path_segment(id))).await
    }

    pub async fn start_action_plan(&self, id: &str) -> Result<ActionPlan> {
        self.update_action_plan(id, [("state", Value::from(ACTION_PLAN_STATE_TRIGGERED))])
            .await
    }

    pub async fn cancel_action_plan(&self, id: &str) -> Result<ActionPlan> {
        self.update_action_plan(id, [("state", Value::from(ACTION_PLAN_STATE_CANCELLED))])
            .await
    }
}
