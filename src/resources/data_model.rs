use crate::error::Result;
use crate::http_client::WatcherClient;
use crate::models::common::query_string;
use crate::models::DataModel;

impl WatcherClient {
    /// Fetch the decision engine's data model, optionally of one type (e.g. `compute`)
    pub async fn get_data_model(&self, model_type: Option<&str>) -> Result<DataModel> {
        let pairs: Vec<(&str, String)> = model_type
            .filter(|t| !t.is_empty())
            .map(|t| ("type", t.to_string()))
            .into_iter()
            .collect();
        self.get(&format!("/data_model{}", query_string(&pairs))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_data_model_type_query() {
        let mut server = mockito::Server::new_async().await;
        let typed = server
            .mock("GET", "/v1/data_model")
            .match_query(Matcher::UrlEncoded("type".into(), "compute".into()))
            .with_status(200)
            .with_body(r#"{"context": [{"server_uuid": "s1"}]}"#)
            .create_async()
            .await;

        let client = WatcherClient::with_token(server.url(), "tok").unwrap();
        let model = client.get_data_model(Some("compute")).await.unwrap();
        assert_eq!(model.context.len(), 1);
        typed.assert_async().await;
    }

    #[tokio::test]
    async fn test_data_model_without_type() {
        let mut server = mockito::Server::new_async().await;
        let untyped = server
            .mock("GET", "/v1/data_model")
            .with_status(200)
            .with_body(r#"{"context": []}"#)
            .expect(2)
            .create_async()
            .await;

        let client = WatcherClient::with_token(server.url(), "tok").unwrap();
        client.get_data_model(None).await.unwrap();
        client.get_data_model(Some("")).await.unwrap();
        untyped.assert_async().await;
    }
}
