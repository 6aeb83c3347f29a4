use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{Action, ActionList, ListOptions};

impl WatcherClient {
    pub async fn get_action(&self, id: &str) -> Result<Action> {
        self.get(&format!("/actions/{}", path_segment(id))).await
    }

    pub async fn list_actions(&self, options: &ListOptions) -> Result<Vec<Action>> {
        let list: ActionList = self
            .get(&format!("/actions{}", options.to_query_string()))
            .await?;
        Ok(list.actions)
    }

    /// Actions belonging to one action plan
    pub async fn list_actions_by_action_plan(
        &self,
        action_plan_id: &str,
        options: &ListOptions,
    ) -> Result<Vec<Action>> {
        let list: ActionList = self
            .get(&format!(
                "/action_plans/{}/actions{}",
                action_plan_id,
                options.to_query_string()
            ))
            .await?;
        Ok(list.actions)
    }
}
