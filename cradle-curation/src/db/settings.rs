//! Engine settings stored in the shared settings table

use cradle_common::Result;
use sqlx::SqlitePool;

const CLASSIFIER_API_KEY: &str = "classifier_api_key";

/// Read the classifier API key from the database tier
pub async fn get_classifier_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    cradle_common::db::get_setting(pool, CLASSIFIER_API_KEY).await
}

/// Persist the classifier API key to the database tier
pub async fn set_classifier_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    cradle_common::db::set_setting(pool, CLASSIFIER_API_KEY, &key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_classifier_key_roundtrip() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();

        assert_eq!(get_classifier_api_key(&pool).await.unwrap(), None);

        set_classifier_api_key(&pool, "secret".to_string()).await.unwrap();
        assert_eq!(
            get_classifier_api_key(&pool).await.unwrap(),
            Some("secret".to_string())
        );
    }
}
