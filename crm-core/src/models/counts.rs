use serde::{Deserialize, Serialize};

use super::WorkflowStage;

/// One aggregate row from the count service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub id: i32,
    pub status_name: String,
    pub status_count: i64,
}

/// Whole-dataset counts by workflow stage, keyed the way the count service
/// returns them. The stage *tabs* do not display these numbers (their
/// badges are derived from the loaded page) but the ids identify the tabs
/// and the aggregates stay available for anything that needs real totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCounts {
    pub all: StageCount,
    pub estimates: StageCount,
    pub dropped_off: StageCount,
    pub in_progress: StageCount,
    pub invoices: StageCount,
}

impl WorkflowCounts {
    pub fn get(&self, stage: WorkflowStage) -> &StageCount {
        match stage {
            WorkflowStage::Estimate => &self.estimates,
            WorkflowStage::DroppedOff => &self.dropped_off,
            WorkflowStage::InProgress => &self.in_progress,
            WorkflowStage::Invoice => &self.invoices,
        }
    }
}

impl Default for WorkflowCounts {
    fn default() -> Self {
        let empty = |id: i32, name: &str| StageCount {
            id,
            status_name: name.to_string(),
            status_count: 0,
        };
        Self {
            all: empty(1, "All"),
            estimates: empty(2, "Estimates"),
            dropped_off: empty(3, "Dropped Off"),
            in_progress: empty(4, "In Progress"),
            invoices: empty(5, "Invoices"),
        }
    }
}
