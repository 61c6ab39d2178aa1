use std::collections::HashMap;

use async_trait::async_trait;

use super::workflow::{ServiceError, WorkflowService};

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`ServiceFactory::backend_name`] of a
/// registered factory. `connection_string` is passed through to that
/// factory unchanged; its meaning is entirely backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `dealer.db`, `:memory:`             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// One implementation per service backend. Each backend crate exports a
/// single unit struct that implements this trait and is registered with a
/// [`ServiceRegistry`] at startup.
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) a connection and return a ready-to-use service.
    /// Implementations are free to bootstrap schemas or warm connection
    /// pools inside this method.
    async fn create(
        &self,
        config: &ServiceConfig,
    ) -> Result<Box<dyn WorkflowService>, ServiceError>;
}

/// Registry of [`ServiceFactory`] instances, keyed by backend name.
///
/// Typical lifetime:
/// 1. Create with `ServiceRegistry::new()`.
/// 2. Call `register` once per known backend.
/// 3. Call `create` whenever a new service is needed.
pub struct ServiceRegistry {
    factories: HashMap<&'static str, Box<dyn ServiceFactory>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory. If a factory with the same
    /// [`ServiceFactory::backend_name`] is already present it is silently
    /// replaced.
    pub fn register(&mut self, factory: Box<dyn ServiceFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend` and return
    /// the service it produces.
    ///
    /// # Errors
    /// * [`ServiceError::Configuration`] when no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &ServiceConfig,
    ) -> Result<Box<dyn WorkflowService>, ServiceError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::models::{
        Customer, Fleet, NewCustomer, NewFleet, NewReferralSource, NewTag, ReferralSource, Tag,
        WorkflowCounts, WorkflowStage,
    };
    use crate::table::{EstimatePage, TableQuery};

    use super::{ServiceConfig, ServiceError, ServiceFactory, ServiceRegistry, WorkflowService};

    // ── stub service ─────────────────────────────────────────────────────
    // Every method is `unimplemented!()`; the tests never call them,
    // they only verify that the registry routes to the correct factory.
    #[derive(Debug)]
    struct StubService;

    #[async_trait]
    impl WorkflowService for StubService {
        async fn fetch_estimates_page(
            &self,
            _query: &TableQuery,
        ) -> Result<EstimatePage, ServiceError> {
            unimplemented!()
        }
        async fn fetch_workflow_counts(&self) -> Result<WorkflowCounts, ServiceError> {
            unimplemented!()
        }
        async fn update_estimate_status(
            &self,
            _id: i64,
            _stage: WorkflowStage,
        ) -> Result<(), ServiceError> {
            unimplemented!()
        }
        async fn create_customer(
            &self,
            _customer: NewCustomer,
        ) -> Result<Customer, ServiceError> {
            unimplemented!()
        }
        async fn create_tag(&self, _tag: NewTag) -> Result<Tag, ServiceError> {
            unimplemented!()
        }
        async fn create_referral_source(
            &self,
            _source: NewReferralSource,
        ) -> Result<ReferralSource, ServiceError> {
            unimplemented!()
        }
        async fn create_fleet(&self, _fleet: NewFleet) -> Result<Fleet, ServiceError> {
            unimplemented!()
        }
    }

    struct StubFactory {
        name: &'static str,
        created: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ServiceFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &ServiceConfig,
        ) -> Result<Box<dyn WorkflowService>, ServiceError> {
            self.created.store(true, Ordering::SeqCst);
            Ok(Box::new(StubService))
        }
    }

    #[tokio::test]
    async fn registry_routes_to_matching_factory() {
        let sqlite_created = Arc::new(AtomicBool::new(false));
        let remote_created = Arc::new(AtomicBool::new(false));

        let mut registry = ServiceRegistry::new();
        registry.register(Box::new(StubFactory {
            name: "sqlite",
            created: sqlite_created.clone(),
        }));
        registry.register(Box::new(StubFactory {
            name: "remote",
            created: remote_created.clone(),
        }));

        let config = ServiceConfig {
            backend: "remote".to_string(),
            connection_string: "https://example.invalid".to_string(),
        };
        registry.create(&config).await.unwrap();

        assert!(remote_created.load(Ordering::SeqCst));
        assert!(!sqlite_created.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_is_a_configuration_error() {
        let registry = ServiceRegistry::new();
        let config = ServiceConfig {
            backend: "postgres".to_string(),
            connection_string: String::new(),
        };

        let err = registry.create(&config).await.unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn available_backends_are_sorted() {
        let mut registry = ServiceRegistry::new();
        registry.register(Box::new(StubFactory {
            name: "sqlite",
            created: Arc::new(AtomicBool::new(false)),
        }));
        registry.register(Box::new(StubFactory {
            name: "remote",
            created: Arc::new(AtomicBool::new(false)),
        }));

        assert_eq!(registry.available_backends(), vec!["remote", "sqlite"]);
    }
}
