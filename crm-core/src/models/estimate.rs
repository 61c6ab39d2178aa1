use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle stage of an estimate: Estimate → Dropped Off → In Progress → Invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkflowStage {
    #[default]
    Estimate,
    DroppedOff,
    InProgress,
    Invoice,
}

impl WorkflowStage {
    pub fn all() -> &'static [WorkflowStage] {
        &[
            WorkflowStage::Estimate,
            WorkflowStage::DroppedOff,
            WorkflowStage::InProgress,
            WorkflowStage::Invoice,
        ]
    }

    /// Display label, as shown in the tab strip and the per-row dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStage::Estimate => "Estimates",
            WorkflowStage::DroppedOff => "Dropped Off",
            WorkflowStage::InProgress => "In Progress",
            WorkflowStage::Invoice => "Invoices",
        }
    }

    pub fn parse_label(s: &str) -> Option<Self> {
        match s {
            "Estimates" => Some(Self::Estimate),
            "Dropped Off" => Some(Self::DroppedOff),
            "In Progress" => Some(Self::InProgress),
            "Invoices" => Some(Self::Invoice),
            _ => None,
        }
    }
}

/// One workflow-table row. Fetched as part of a read-only page; only the
/// workflow stage is ever mutated, and only through the status-update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: i64,
    pub order_no: String,
    pub order_name: String,
    pub customer_name: String,
    pub total: Decimal,
    pub payment_terms: Option<String>,
    pub paid_status: Option<String>,
    pub workflow: WorkflowStage,
    pub inspection_status: Option<String>,
    pub order_status: Option<String>,
    pub is_authorized: bool,
    pub technician: Option<String>,
    pub appointment: Option<String>,
    pub tags: Vec<String>,

    pub due_date: Option<DateTime<Utc>>,
    pub payment_due_date: Option<DateTime<Utc>>,
    pub authorized_date: Option<DateTime<Utc>>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub fully_paid_date: Option<DateTime<Utc>>,
    pub workflow_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
}

impl Estimate {
    /// Keyword match used by the client-side tab views.
    pub fn stage_matches(&self, keyword: &str) -> bool {
        self.workflow.label().contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stage_labels_round_trip() {
        for stage in WorkflowStage::all() {
            assert_eq!(WorkflowStage::parse_label(stage.label()), Some(*stage));
        }
        assert_eq!(WorkflowStage::parse_label("Archived"), None);
    }
}
