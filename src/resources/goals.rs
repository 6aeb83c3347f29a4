use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{Goal, GoalList, ListOptions};

impl WatcherClient {
    /// Look up a goal by UUID or name
    pub async fn get_goal(&self, id: &str) -> Result<Goal> {
        self.get(&format!("/goals/{}", path_segment(id))).await
    }

    pub async fn list_goals(&self, options: &ListOptions) -> Result<Vec<Goal>> {
        let list: GoalList = self
            .get(&format!("/goals{}", options.to_query_string()))
            .await?;
        Ok(list.goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_goals() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/goals")
            .with_status(200)
            .with_body(
                r#"{"goals": [
                    {"uuid": "g1", "name": "dummy", "display_name": "Dummy goal"},
                    {"uuid": "g2", "name": "server_consolidation"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = WatcherClient::with_token(server.url(), "tok").unwrap();
        let goals = client.list_goals(&ListOptions::default()).await.unwrap();

        let names: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["dummy", "server_consolidation"]);
    }

    #[tokio::test]
    async fn test_get_goal_by_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/goals/dummy")
            .with_status(200)
            .with_body(r#"{"uuid": "g1", "name": "dummy"}"#)
            .create_async()
            .await;

        let client = WatcherClient::with_token(server.url(), "tok").unwrap();
        assert_eq!(client.get_goal("dummy").await.unwrap().uuid, "g1");
    }
}
