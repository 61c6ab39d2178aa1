use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Customer, Fleet, NewCustomer, NewFleet, NewReferralSource, NewTag, ReferralSource, Tag,
    WorkflowCounts, WorkflowStage,
};
use crate::table::{EstimatePage, TableQuery};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The backing services the workflow UI talks to.
///
/// The page fetch and the count fetch are independent round trips against
/// the same backing query: a count refresh never forces a row redownload,
/// and vice versa. The status update mutates exactly one field of one row;
/// callers refetch the current page afterwards rather than patching the
/// row locally, so the server stays the source of truth.
#[async_trait]
pub trait WorkflowService: Send + Sync + std::fmt::Debug {
    /// One page of estimates matching the descriptor, plus the backing
    /// total. The descriptor's sort spec is applied verbatim.
    async fn fetch_estimates_page(
        &self,
        query: &TableQuery,
    ) -> Result<EstimatePage, ServiceError>;

    /// Whole-dataset counts by workflow stage.
    async fn fetch_workflow_counts(&self) -> Result<WorkflowCounts, ServiceError>;

    /// Moves one estimate to a new workflow stage.
    async fn update_estimate_status(
        &self,
        id: i64,
        stage: WorkflowStage,
    ) -> Result<(), ServiceError>;

    // Intake-form collaborators
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, ServiceError>;
    async fn create_tag(&self, tag: NewTag) -> Result<Tag, ServiceError>;
    async fn create_referral_source(
        &self,
        source: NewReferralSource,
    ) -> Result<ReferralSource, ServiceError>;
    async fn create_fleet(&self, fleet: NewFleet) -> Result<Fleet, ServiceError>;
}
