//! Database integration tests
//!
//! Tests the SeaORM model and usage stores using a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::{ModelFactory, TestDatabase};
    use chrono::{Duration, Utc};
    use llmgate::core::models::{ModelFilter, ModelStatus, UsageStatus};
    use llmgate::storage::{ModelStore, UsageStore};
    use llmgate::GatewayError;

    #[tokio::test]
    async fn test_database_health_check() {
        let test_db = TestDatabase::new().await;
        let health = test_db.db().health_check().await;
        assert!(health.is_ok(), "Health check failed: {:?}", health.err());
    }

    // ==================== Model Store Tests ====================

    #[tokio::test]
    async fn test_model_round_trip() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let model = ModelFactory::stored("gpt-test");

        db.insert(model.clone()).await.unwrap();

        let by_id = db.get_by_id(model.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "gpt-test");
        assert_eq!(by_id.status, ModelStatus::Active);
        assert_eq!(by_id.config["vault_path"], "secret/x");
        assert_eq!(by_id.encrypted_api_key, model.encrypted_api_key);
        assert_eq!(by_id.quota_daily, model.quota_daily);

        let by_name = db.find("gpt-test").await.unwrap().unwrap();
        assert_eq!(by_name.id, model.id);
        assert!(db.find(&model.id.to_string()).await.unwrap().is_some());
        assert!(db.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        db.insert(ModelFactory::stored("dup")).await.unwrap();

        let err = db.insert(ModelFactory::stored("dup")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        for i in 0..5 {
            db.insert(ModelFactory::stored(&format!("m{}", i))).await.unwrap();
        }
        let mut disabled = ModelFactory::stored("off");
        disabled.status = ModelStatus::Disabled;
        db.insert(disabled).await.unwrap();

        let (page, total) = db
            .list(&ModelFilter {
                status: Some(ModelStatus::Active),
                page: 1,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let (_, total) = db
            .list(&ModelFilter {
                provider: Some("OpenAI".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let mut model = db.insert(ModelFactory::stored("m")).await.unwrap();

        model.quota_daily = 42;
        model.status = ModelStatus::Deprecated;
        db.update(model.clone()).await.unwrap();

        let stored = db.get_by_id(model.id).await.unwrap().unwrap();
        assert_eq!(stored.quota_daily, 42);
        assert_eq!(stored.status, ModelStatus::Deprecated);

        assert!(db.delete(model.id).await.unwrap());
        assert!(!db.delete(model.id).await.unwrap());
        let err = db.update(model).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    // ==================== Usage Store Tests ====================

    #[tokio::test]
    async fn test_sum_counts_successes_in_window() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let model = db.insert(ModelFactory::stored("m")).await.unwrap();
        let now = Utc::now();

        for record in [
            ModelFactory::usage(model.id, 100, UsageStatus::Success, now),
            ModelFactory::usage(model.id, 50, UsageStatus::Success, now - Duration::minutes(5)),
            ModelFactory::usage(model.id, 999, UsageStatus::Error, now),
            ModelFactory::usage(model.id, 999, UsageStatus::Timeout, now),
            ModelFactory::usage(model.id, 7, UsageStatus::Success, now - Duration::days(3)),
        ] {
            db.append(record).await.unwrap();
        }

        let from = now - Duration::hours(1);
        let to = now + Duration::seconds(1);
        assert_eq!(db.sum_tokens(model.id, from, to).await.unwrap(), 150);
        assert_eq!(
            db.sum_tokens(model.id, now - Duration::days(7), to).await.unwrap(),
            157
        );
        assert_eq!(db.sum_tokens(model.id, to, to + Duration::hours(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recent_usage_newest_first() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let model = db.insert(ModelFactory::stored("m")).await.unwrap();
        let now = Utc::now();

        for minutes in [30, 10, 20] {
            db.append(ModelFactory::usage(
                model.id,
                minutes,
                UsageStatus::Success,
                now - Duration::minutes(minutes),
            ))
            .await
            .unwrap();
        }

        let records = db.list_for_model(model.id, 2).await.unwrap();
        let tokens: Vec<i64> = records.iter().map(|r| r.tokens_used).collect();
        assert_eq!(tokens, vec![10, 20]);
        assert_eq!(records[0].user_id.as_deref(), Some("user-1"));
    }
}
