//! Table-query engine for the workflow table.
//!
//! A [`TableQuery`] is the query descriptor governing one page fetch:
//! pagination, sort, free-text query, and the externally supplied filter.
//! Committed changes to page index, page size, sort, or filter bump an
//! internal generation counter exactly once; the UI issues one page fetch
//! and one counts fetch per generation it observes, never more.
//!
//! All tab views render the same loaded page, filtered client-side by a
//! stage-keyword match. Per-tab counts therefore reflect only the loaded
//! page, not the backing dataset, a deliberate approximation carried over
//! from the original design.

use serde::{Deserialize, Serialize};

use crate::models::{Estimate, WorkflowStage};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Sort specification. Opaque to the engine: the key is passed through
/// verbatim to the fetch call, and its meaning is entirely the backing
/// query's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }
}

/// Externally supplied filter object, forwarded to the fetch call unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimateFilter {
    pub stage: Option<WorkflowStage>,
    pub technician: Option<String>,
}

/// The query descriptor: `{page_index, page_size, sort, query, filter}`
/// plus a generation counter that advances once per committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    page_index: u32,
    page_size: u32,
    sort: Option<SortSpec>,
    query: String,
    filter: EstimateFilter,
    generation: u64,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl TableQuery {
    pub fn new() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            query: String::new(),
            filter: EstimateFilter::default(),
            generation: 0,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self) -> &EstimateFilter {
        &self.filter
    }

    /// Fetches observe this; one fetch per new value.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Zero-based row offset for the backing query.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Number of pages needed to cover `total` records. At least 1 so the
    /// pagination controls always have a current page to show.
    pub fn page_count(&self, total: u64) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(u64::from(self.page_size)).max(1)
    }

    pub fn set_page_index(&mut self, page: u32) {
        let page = page.max(1);
        if self.page_index != page {
            self.page_index = page;
            self.generation += 1;
        }
    }

    /// Changing the page size resets the page index to the first page.
    /// One committed change, one generation bump.
    pub fn set_page_size(&mut self, size: u32) {
        let size = size.max(1);
        if self.page_size != size {
            self.page_size = size;
            self.page_index = 1;
            self.generation += 1;
        }
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        if self.sort != sort {
            self.sort = sort;
            self.generation += 1;
        }
    }

    /// Click-to-sort: first click on a column sorts ascending, a second
    /// click on the same column flips the direction.
    pub fn toggle_sort(&mut self, key: &str) {
        let order = match &self.sort {
            Some(spec) if spec.key == key => spec.order.toggled(),
            _ => SortOrder::Asc,
        };
        self.set_sort(Some(SortSpec::new(key, order)));
    }

    pub fn set_filter(&mut self, filter: EstimateFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.generation += 1;
        }
    }

    /// Mutates the free-text query without bumping the generation: query
    /// edits alone do not refetch, the new text rides along with the next
    /// committed change.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }
}

/// One loaded page of records plus the backing total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimatePage {
    pub records: Vec<Estimate>,
    pub total: u64,
}

/// Admits fetch responses in issue order, discarding any that arrive after
/// a newer response has already been applied. Closes the race where a slow
/// response for an old descriptor would overwrite a newer query's result.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    accepted: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags an outgoing request. Strictly increasing.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `true` if the response tagged `seq` is newer than anything
    /// applied so far, and records it as applied. Stale responses return
    /// `false` and must be dropped by the caller.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq > self.accepted {
            self.accepted = seq;
            true
        } else {
            false
        }
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }
}

/// Rows of the loaded page whose stage label contains `keyword`.
pub fn filter_by_stage<'a>(records: &'a [Estimate], keyword: &str) -> Vec<&'a Estimate> {
    records.iter().filter(|r| r.stage_matches(keyword)).collect()
}

/// Loaded-page count for a stage keyword. This is the tab-badge number:
/// it counts only the records currently loaded, not the whole dataset.
pub fn count_by_stage(records: &[Estimate], keyword: &str) -> usize {
    records.iter().filter(|r| r.stage_matches(keyword)).count()
}

/// State machine for one inline stage edit.
///
/// Idle → Submitting on dropdown selection. Success refetches the page
/// with the unchanged descriptor and returns to Idle; failure is logged
/// and returns to Idle without touching the row (no optimistic update was
/// applied, so there is nothing to roll back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusEdit {
    #[default]
    Idle,
    Submitting {
        id: i64,
        stage: WorkflowStage,
    },
}

impl StatusEdit {
    /// Dropdown selection made. Returns `None` if an edit is already in
    /// flight; the UI ignores further selections until it settles.
    pub fn begin(&mut self, id: i64, stage: WorkflowStage) -> Option<(i64, WorkflowStage)> {
        match self {
            StatusEdit::Idle => {
                *self = StatusEdit::Submitting { id, stage };
                Some((id, stage))
            }
            StatusEdit::Submitting { .. } => None,
        }
    }

    /// Update call settled, either way. Returns to Idle.
    pub fn settle(&mut self) {
        *self = StatusEdit::Idle;
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, StatusEdit::Submitting { .. })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn estimate(id: i64, stage: WorkflowStage) -> Estimate {
        Estimate {
            id,
            order_no: format!("ORD-{id:04}"),
            order_name: format!("Order {id}"),
            customer_name: "Avery Shaw".to_string(),
            total: dec!(125.50),
            payment_terms: None,
            paid_status: None,
            workflow: stage,
            inspection_status: None,
            order_status: None,
            is_authorized: false,
            technician: None,
            appointment: None,
            tags: Vec::new(),
            due_date: None,
            payment_due_date: None,
            authorized_date: None,
            invoice_date: None,
            fully_paid_date: None,
            workflow_date: None,
            created_date: Utc::now(),
        }
    }

    #[test]
    fn page_size_change_resets_page_index() {
        let mut query = TableQuery::new();
        query.set_page_index(4);
        assert_eq!(query.page_index(), 4);

        query.set_page_size(25);
        assert_eq!(query.page_index(), 1);
        assert_eq!(query.page_size(), 25);
    }

    #[test]
    fn each_committed_change_bumps_generation_once() {
        let mut query = TableQuery::new();
        let start = query.generation();

        query.set_page_index(2);
        assert_eq!(query.generation(), start + 1);

        query.set_page_size(25);
        assert_eq!(query.generation(), start + 2);

        query.set_sort(Some(SortSpec::new("total", SortOrder::Desc)));
        assert_eq!(query.generation(), start + 3);

        query.set_filter(EstimateFilter {
            stage: Some(WorkflowStage::InProgress),
            technician: None,
        });
        assert_eq!(query.generation(), start + 4);
    }

    #[test]
    fn setting_current_value_is_a_no_op() {
        let mut query = TableQuery::new();
        query.set_page_index(3);
        let generation = query.generation();

        query.set_page_index(3);
        query.set_page_size(DEFAULT_PAGE_SIZE);
        query.set_sort(None);
        query.set_filter(EstimateFilter::default());
        assert_eq!(query.generation(), generation);
    }

    #[test]
    fn query_text_does_not_trigger_refetch() {
        let mut query = TableQuery::new();
        let generation = query.generation();
        query.set_query("brake job");
        assert_eq!(query.generation(), generation);
        assert_eq!(query.query(), "brake job");
    }

    #[test]
    fn toggle_sort_flips_direction_on_same_column() {
        let mut query = TableQuery::new();
        query.toggle_sort("total");
        assert_eq!(
            query.sort(),
            Some(&SortSpec::new("total", SortOrder::Asc))
        );

        query.toggle_sort("total");
        assert_eq!(
            query.sort(),
            Some(&SortSpec::new("total", SortOrder::Desc))
        );

        query.toggle_sort("due_date");
        assert_eq!(
            query.sort(),
            Some(&SortSpec::new("due_date", SortOrder::Asc))
        );
    }

    #[test]
    fn offset_is_zero_based() {
        let mut query = TableQuery::new();
        assert_eq!(query.offset(), 0);
        query.set_page_index(3);
        query.set_page_size(25);
        // page size change reset to page 1
        assert_eq!(query.offset(), 0);
        query.set_page_index(2);
        assert_eq!(query.offset(), 25);
    }

    #[test]
    fn page_count_covers_partial_pages() {
        let query = TableQuery::new(); // page size 10
        assert_eq!(query.page_count(0), 1);
        assert_eq!(query.page_count(10), 1);
        assert_eq!(query.page_count(25), 3);
    }

    #[test]
    fn sequencer_discards_stale_responses() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();

        // The newer response lands first; the older one must be dropped.
        assert!(seq.accept(second));
        assert!(!seq.accept(first));

        let third = seq.issue();
        assert!(seq.accept(third));
    }

    #[test]
    fn tab_counts_reflect_loaded_page_only() {
        // Backing dataset has 25 records; this page holds 10.
        let mut records: Vec<Estimate> = Vec::new();
        for id in 0..4 {
            records.push(estimate(id, WorkflowStage::Estimate));
        }
        for id in 4..7 {
            records.push(estimate(id, WorkflowStage::DroppedOff));
        }
        for id in 7..9 {
            records.push(estimate(id, WorkflowStage::InProgress));
        }
        records.push(estimate(9, WorkflowStage::Invoice));

        let page = EstimatePage {
            records,
            total: 25,
        };

        // The "All" badge shows the loaded-page length, not the total.
        assert_eq!(page.records.len(), 10);
        assert_eq!(count_by_stage(&page.records, "Estimates"), 4);
        assert_eq!(count_by_stage(&page.records, "Dropped Off"), 3);
        assert_eq!(count_by_stage(&page.records, "In Progress"), 2);
        assert_eq!(count_by_stage(&page.records, "Invoices"), 1);
    }

    #[test]
    fn filter_by_stage_keeps_order() {
        let records = vec![
            estimate(1, WorkflowStage::Invoice),
            estimate(2, WorkflowStage::Estimate),
            estimate(3, WorkflowStage::Invoice),
        ];
        let invoices = filter_by_stage(&records, "Invoices");
        let ids: Vec<i64> = invoices.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn status_edit_runs_idle_submitting_idle() {
        let mut edit = StatusEdit::default();
        assert_eq!(
            edit.begin(42, WorkflowStage::DroppedOff),
            Some((42, WorkflowStage::DroppedOff))
        );
        assert!(edit.is_submitting());

        // A second selection while one is in flight is ignored.
        assert_eq!(edit.begin(7, WorkflowStage::Invoice), None);

        edit.settle();
        assert_eq!(edit, StatusEdit::Idle);
    }
}
