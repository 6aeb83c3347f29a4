use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::path_segment;
use crate::models::{ListOptions, Strategy, StrategyList};

impl WatcherClient {
    pub async fn get_strategy(&self, id: &str) -> Result<Strategy> {
        self.get(&format!("/strategies/{}", path_segment(id))).await
    }

    pub async fn list_strategies(&self, options: &ListOptions) -> Result<Vec<Strategy>> {
        let list: StrategyList = self
            .get(&format!("/strategies{}", options.to_query_string()))
            .await?;
        Ok(list.strategies)
    }

    /// Strategies able to achieve the given goal
    pub async fn list_strategies_by_goal(
        &self,
        goal_id: &str,
        options: &ListOptions,
    ) -> Result<Vec<Strategy>> {
        let list: StrategyList = self
            .get(&format!(
                "/goals/{}/strategies{}",
                goal_id,
                options.to_query_string()
            ))
            .await?;
        Ok(list.strategies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_strategies_by_goal() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/goals/g1/strategies")
            .with_status(200)
            .with_body(r#"{"strategies": [{"uuid": "s1", "name": "basic", "goal_uuid": "g1"}]}"#)
            .create_async()
            .await;

        let client = WatcherClient::with_token(server.url(), "tok").unwrap();
        let strategies = client
            .list_strategies_by_goal("g1", &ListOptions::default())
            .await
            .unwrap();

        assert_eq!(strategies[0].goal_uuid.as_deref(), Some("g1"));
        mock.assert_async().await;
    }
}
