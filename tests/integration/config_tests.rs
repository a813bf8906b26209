//! Configuration loading tests

#[cfg(test)]
mod tests {
    use llmgate::Config;
    use std::io::Write;

    const EXAMPLE: &str = include_str!("../../config/gateway.yaml.example");

    #[tokio::test]
    async fn test_example_config_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.cache().ttl, 3600);
        assert_eq!(config.circuit_breaker().failure_threshold, 5);
        assert_eq!(config.circuit_breaker().timeout, 60);
        assert_eq!(config.circuit_breaker().interval, 60);
        assert_eq!(config.vault().credential_cache_ttl, 300);
        assert_eq!(
            config.pipeline().fallbacks.get("claude-opus-4-5-20251101").map(String::as_str),
            Some("claude-sonnet-4-5-20250929")
        );
    }

    #[tokio::test]
    async fn test_yaml_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();
        let config = Config::from_file(file.path()).await.unwrap();

        let yaml = config.to_yaml().unwrap();
        let mut copy = tempfile::NamedTempFile::new().unwrap();
        copy.write_all(yaml.as_bytes()).unwrap();
        let reloaded = Config::from_file(copy.path()).await.unwrap();

        assert_eq!(reloaded.cache().ttl, config.cache().ttl);
        assert_eq!(reloaded.pipeline().fallbacks, config.pipeline().fallbacks);
    }

    #[tokio::test]
    async fn test_invalid_yaml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"cache: [not, a, map").unwrap();
        assert!(Config::from_file(file.path()).await.is_err());
    }
}
