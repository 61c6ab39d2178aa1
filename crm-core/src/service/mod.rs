pub mod factory;
pub mod workflow;

pub use factory::{ServiceConfig, ServiceFactory, ServiceRegistry};
pub use workflow::{ServiceError, WorkflowService};
