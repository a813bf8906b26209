//! Gateway integration tests
//!
//! Assembles the full gateway over in-memory SQLite and drives it against mocked
//! Anthropic endpoints.

#[cfg(test)]
mod tests {
    use crate::common::database::test_db_config;
    use crate::common::fixtures::TEST_MASTER_KEY;
    use crate::common::{ModelFactory, RequestFactory};
    use llmgate::core::models::{CreateModelPayload, UsageStatus};
    use llmgate::{
        Config, Gateway, GatewayError, HealthStatus, RequestContext, Result, ResultCode,
        StreamChunk,
    };
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> Config {
        let mut config = Config::default();
        config.gateway.storage.database = test_db_config();
        config.gateway.storage.redis.enabled = false;
        config.gateway.security.master_key = TEST_MASTER_KEY.to_string();
        config
    }

    fn reply(text: &str) -> Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    async fn mount_reply(server: &MockServer, route: &str, text: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{}/messages", route)))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(text)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_complete_caches_and_records_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Paris")))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = Gateway::new(config()).await.unwrap();
        let model = gateway
            .service()
            .create_model(ModelFactory::anthropic("geo", &server.uri()))
            .await
            .unwrap();
        let request = RequestFactory::deterministic("geo", "Capital of France?");
        let ctx = RequestContext::new().with_user_id("alice");

        let first = gateway.complete(&request, &ctx).await.unwrap();
        assert_eq!(first.response.content, "Paris");
        assert!(!first.from_cache);

        let second = gateway.complete(&request, &ctx).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.response, first.response);

        let quota = gateway.service().check_quota("geo").await.unwrap();
        assert_eq!(quota.daily_used, 15);

        let usage = gateway.service().ledger().recent_usage(model.id, 10).await.unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].status, UsageStatus::Success);
        assert_eq!(usage[0].user_id.as_deref(), Some("alice"));
        assert_eq!(usage[0].prompt_hash.len(), 64);

        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_quota_blocks_after_budget_spent() {
        let server = MockServer::start().await;
        mount_reply(&server, "", "ok").await;

        let gateway = Gateway::new(config()).await.unwrap();
        gateway
            .service()
            .create_model(CreateModelPayload {
                quota_daily: Some(10),
                ..ModelFactory::anthropic("small", &server.uri())
            })
            .await
            .unwrap();
        let request = RequestFactory::deterministic("small", "hi").with_temperature(0.7);

        gateway.complete(&request, &RequestContext::default()).await.unwrap();
        let err = gateway
            .complete(&request, &RequestContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::QuotaExceeded(_)));
        assert_eq!(err.result_code(), ResultCode::RateLimited);
        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_configured_fallback_serves_failed_primary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/primary/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;
        mount_reply(&server, "/backup", "from backup").await;

        let mut config = config();
        config
            .gateway
            .pipeline
            .fallbacks
            .insert("primary".to_string(), "backup".to_string());
        let gateway = Gateway::new(config).await.unwrap();
        let service = gateway.service();
        let primary = service
            .create_model(ModelFactory::anthropic("primary", &format!("{}/primary", server.uri())))
            .await
            .unwrap();
        let backup = service
            .create_model(ModelFactory::anthropic("backup", &format!("{}/backup", server.uri())))
            .await
            .unwrap();

        let result = gateway
            .complete(&RequestFactory::deterministic("primary", "hi"), &RequestContext::default())
            .await
            .unwrap();
        assert!(result.used_fallback);
        assert_eq!(result.response.content, "from backup");

        let ledger = service.ledger();
        let primary_rows = ledger.recent_usage(primary.id, 10).await.unwrap();
        assert!(primary_rows.is_empty());
        let backup_rows = ledger.recent_usage(backup.id, 10).await.unwrap();
        assert_eq!(backup_rows.len(), 1);
        assert_eq!(backup_rows[0].tokens_used, 15);

        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_stream_through_gateway() {
        let server = MockServer::start().await;
        let events = [
            json!({"type": "message_start", "message": {"usage": {"input_tokens": 4}}}),
            json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "Bon"}}),
            json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "jour"}}),
            json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 2}}),
            json!({"type": "message_stop"}),
        ];
        let body: String = events.iter().map(|e| format!("data: {}\n\n", e)).collect();
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let gateway = Gateway::new(config()).await.unwrap();
        let model = gateway
            .service()
            .create_model(ModelFactory::anthropic("fr", &server.uri()))
            .await
            .unwrap();

        let mut text = String::new();
        let mut callback = |chunk: StreamChunk| -> Result<()> {
            text.push_str(&chunk.content);
            Ok(())
        };
        let summary = gateway
            .stream_complete(
                &RequestFactory::deterministic("fr", "Say hello"),
                &RequestContext::default(),
                &mut callback,
            )
            .await
            .unwrap();

        assert_eq!(text, "Bonjour");
        assert_eq!(summary.usage.total_tokens, 6);
        let rows = gateway.service().ledger().recent_usage(model.id, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tokens_used, 6);

        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_api_envelopes_over_database() {
        let gateway = Gateway::new(config()).await.unwrap();
        let api = gateway.api();

        let created = api
            .create_model(ModelFactory::anthropic("env", "http://localhost:1"))
            .await;
        assert!(created.is_success());

        let duplicate = api
            .create_model(ModelFactory::anthropic("env", "http://localhost:1"))
            .await;
        assert_eq!(duplicate.code, ResultCode::Conflict);

        let creds = api.get_credentials("env").await;
        assert_eq!(creds.data.unwrap().api_key, "sk-ant-integration");

        gateway.delete_model("env").await.unwrap();
        assert_eq!(api.get_model("env").await.code, ResultCode::NotFound);

        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_health_and_model_checks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/up/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/down/models"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = Gateway::new(config()).await.unwrap();
        let health = gateway.health().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.components.iter().all(|c| c.error.is_none()));

        let service = gateway.service();
        service
            .create_model(ModelFactory::anthropic("up", &format!("{}/up", server.uri())))
            .await
            .unwrap();
        service
            .create_model(ModelFactory::anthropic("down", &format!("{}/down", server.uri())))
            .await
            .unwrap();

        let up = gateway.check_model("up").await.unwrap();
        assert_eq!(up.status, HealthStatus::Healthy);
        let down = gateway.check_model("down").await.unwrap();
        assert_eq!(down.status, HealthStatus::Unhealthy);
        assert!(down.error.is_some());
        assert!(gateway.provider_status().is_empty());

        gateway.shutdown().await;
    }
}
