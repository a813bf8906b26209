//! E2E tests against the Anthropic Messages API
//!
//! These tests make real API calls and require API keys.
//! Run with: cargo test --all-features -- --ignored

#[cfg(test)]
mod tests {
    use crate::common::ModelFactory;
    use crate::common::RequestFactory;
    use crate::skip_without_env;
    use llmgate::core::models::CreateModelPayload;
    use llmgate::{Config, Gateway, RequestContext};

    async fn gateway() -> Gateway {
        let mut config = Config::default();
        config.gateway.storage.database.enabled = false;
        config.gateway.security.master_key = "e2e-master-key".to_string();
        Gateway::new(config).await.expect("Failed to build gateway")
    }

    #[tokio::test]
    #[ignore]
    async fn test_anthropic_completion_round_trip() {
        skip_without_env!("ANTHROPIC_API_KEY");
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();

        let gateway = gateway().await;
        gateway
            .service()
            .create_model(CreateModelPayload {
                model_id: "claude-haiku-4-5-20251001".to_string(),
                api_key,
                ..ModelFactory::anthropic("haiku", "https://api.anthropic.com/v1")
            })
            .await
            .expect("Failed to register model");

        let request = RequestFactory::deterministic("haiku", "Say 'test passed' and nothing else");
        let result = gateway.complete(&request, &RequestContext::default()).await;
        assert!(result.is_ok(), "Completion failed: {:?}", result.err());

        let result = result.unwrap();
        assert!(!result.response.content.is_empty());
        assert!(result.response.usage.total_tokens > 0);

        let cached = gateway
            .complete(&request, &RequestContext::default())
            .await
            .unwrap();
        assert!(cached.from_cache);

        gateway.shutdown().await;
    }
}
