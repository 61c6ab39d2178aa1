use async_trait::async_trait;

use crm_core::service::{ServiceConfig, ServiceError, ServiceFactory, WorkflowService};

use crate::SqliteWorkflowService;

/// [`ServiceFactory`] for SQLite.
///
/// Register this with a [`crm_core::service::ServiceRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use crm_core::service::ServiceRegistry;
/// use crm_db_sqlite::SqliteServiceFactory;
///
/// let mut registry = ServiceRegistry::new();
/// registry.register(Box::new(SqliteServiceFactory));
/// ```
pub struct SqliteServiceFactory;

#[async_trait]
impl ServiceFactory for SqliteServiceFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"dealer.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"` for an ephemeral in-memory database (useful for tests).
    async fn create(
        &self,
        config: &ServiceConfig,
    ) -> Result<Box<dyn WorkflowService>, ServiceError> {
        let service = SqliteWorkflowService::new(&config.connection_string).await?;
        service.init_schema().await?;
        Ok(Box::new(service))
    }
}

#[cfg(test)]
mod tests {
    use crm_core::service::{ServiceConfig, ServiceFactory};

    use super::SqliteServiceFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteServiceFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_service() {
        let config = ServiceConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let result = SqliteServiceFactory.create(&config).await;
        assert!(
            result.is_ok(),
            "failed to create in-memory service: {:#?}",
            result.err()
        );
    }
}
