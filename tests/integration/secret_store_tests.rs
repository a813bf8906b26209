//! Secret store integration tests
//!
//! Exercises the Vault-compatible HTTP store and the credential vault against a mock server.

#[cfg(test)]
mod tests {
    use llmgate::core::vault::{CredentialVault, HttpSecretStore, KeyCipher, SecretStore};
    use llmgate::GatewayError;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpSecretStore {
        HttpSecretStore::new(
            server.uri(),
            Some("vault-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reads_kv_v1_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/anthropic"))
            .and(header("X-Vault-Token", "vault-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"api_key": "sk-v1", "base_url": "https://proxy/v1"}
            })))
            .mount(&server)
            .await;

        let data = store(&server).read("secret/anthropic").await.unwrap().unwrap();
        assert_eq!(data["api_key"], "sk-v1");
    }

    #[tokio::test]
    async fn test_reads_kv_v2_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/data/openai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "data": {"api_key": "sk-v2"},
                    "metadata": {"version": 3}
                }
            })))
            .mount(&server)
            .await;

        let data = store(&server).read("/kv/data/openai").await.unwrap().unwrap();
        assert_eq!(data["api_key"], "sk-v2");
        assert!(!data.contains_key("metadata"));
    }

    #[tokio::test]
    async fn test_missing_path_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/secret/none"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/v1/secret/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.read("secret/none").await.unwrap().is_none());
        let err = store.read("secret/broken").await.unwrap_err();
        assert!(matches!(err, GatewayError::VaultReadFailed(_)));
    }

    #[tokio::test]
    async fn test_vault_caches_http_reads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/pool"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"api_key": "sk-1", "api_keys": ["sk-2", "sk-3"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vault = CredentialVault::new(
            KeyCipher::new(b"integration"),
            Arc::new(store(&server)),
            Duration::from_secs(300),
            Duration::from_secs(60),
        );

        for _ in 0..3 {
            let creds = vault.fetch_credentials("secret/pool").await.unwrap();
            assert_eq!(creds.key_pool(), vec!["sk-1", "sk-2", "sk-3"]);
        }
        assert_eq!(vault.cached_entries(), 1);
        vault.shutdown().await;
    }
}
