pub mod models;
pub mod service;
pub mod table;

pub use models::*;
pub use service::{ServiceConfig, ServiceError, ServiceFactory, ServiceRegistry, WorkflowService};
pub use table::{
    EstimateFilter, EstimatePage, RequestSequencer, SortOrder, SortSpec, StatusEdit, TableQuery,
};
