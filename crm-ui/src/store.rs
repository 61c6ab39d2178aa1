//! Workflow table state and its reducer.
//!
//! All mutations of the table state go through [`WorkflowStore::dispatch`]
//! with a typed [`Action`], so every state transition is testable without
//! a running UI or backend.

use crm_core::{
    Estimate, EstimateFilter, EstimatePage, SortSpec, TableQuery, WorkflowCounts, WorkflowStage,
};

/// Which tab of the workflow table is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowTab {
    #[default]
    All,
    Stage(WorkflowStage),
}

impl WorkflowTab {
    pub fn all() -> [WorkflowTab; 5] {
        [
            WorkflowTab::All,
            WorkflowTab::Stage(WorkflowStage::Estimate),
            WorkflowTab::Stage(WorkflowStage::DroppedOff),
            WorkflowTab::Stage(WorkflowStage::InProgress),
            WorkflowTab::Stage(WorkflowStage::Invoice),
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowTab::All => "All",
            WorkflowTab::Stage(stage) => stage.label(),
        }
    }
}

/// A state transition of the workflow table.
#[derive(Debug, Clone)]
pub enum Action {
    SetPageIndex(u32),
    SetPageSize(u32),
    /// Toggle sort on a column: Asc on first click, flipped on repeat.
    SortBy(String),
    SetSort(Option<SortSpec>),
    SetFilter(EstimateFilter),
    SetQuery(String),
    SelectTab(WorkflowTab),
    PageLoaded(EstimatePage),
    PageFailed,
    CountsLoaded(WorkflowCounts),
    OpenDrawer(Estimate),
    CloseDrawer,
}

/// State behind the estimate workflow screen.
#[derive(Debug, Clone, Default)]
pub struct WorkflowStore {
    /// Records of the currently loaded page, unfiltered.
    pub estimate_list: Vec<Estimate>,
    /// True while a page fetch is in flight.
    pub loading: bool,
    /// The table descriptor driving server-side fetches.
    pub table: TableQuery,
    /// Total matching records reported by the backend.
    pub total: u64,
    /// Stage counts for the tab badges.
    pub counts: WorkflowCounts,
    /// Record shown in the detail drawer, if open.
    pub selected: Option<Estimate>,
    pub drawer_open: bool,
    pub active_tab: WorkflowTab,
}

impl WorkflowStore {
    pub fn page_count(&self) -> u64 {
        self.table.page_count(self.total)
    }

    /// Loaded-page records visible under the active tab.
    pub fn visible_estimates(&self) -> Vec<&Estimate> {
        match self.active_tab {
            WorkflowTab::All => self.estimate_list.iter().collect(),
            WorkflowTab::Stage(stage) => {
                crm_core::table::filter_by_stage(&self.estimate_list, stage.label())
            }
        }
    }

    /// Badge value for a tab. `All` counts the loaded page, stage tabs
    /// count loaded-page records whose stage label matches.
    pub fn tab_count(&self, tab: WorkflowTab) -> usize {
        match tab {
            WorkflowTab::All => self.estimate_list.len(),
            WorkflowTab::Stage(stage) => {
                crm_core::table::count_by_stage(&self.estimate_list, stage.label())
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetPageIndex(index) => self.table.set_page_index(index),
            Action::SetPageSize(size) => self.table.set_page_size(size),
            Action::SortBy(key) => self.table.toggle_sort(&key),
            Action::SetSort(spec) => self.table.set_sort(spec),
            Action::SetFilter(filter) => self.table.set_filter(filter),
            Action::SetQuery(text) => self.table.set_query(text),
            Action::SelectTab(tab) => self.active_tab = tab,
            Action::PageLoaded(page) => {
                self.estimate_list = page.records;
                self.total = page.total;
                self.loading = false;
            }
            Action::PageFailed => self.loading = false,
            Action::CountsLoaded(counts) => self.counts = counts,
            Action::OpenDrawer(estimate) => {
                self.selected = Some(estimate);
                self.drawer_open = true;
            }
            Action::CloseDrawer => {
                self.selected = None;
                self.drawer_open = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crm_core::SortOrder;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn estimate(id: i64, stage: WorkflowStage) -> Estimate {
        Estimate {
            id,
            order_no: format!("ORD-{id:04}"),
            order_name: format!("Job {id}"),
            customer_name: "Avery Diaz".into(),
            total: dec!(125.00),
            payment_terms: None,
            paid_status: None,
            inspection_status: None,
            order_status: None,
            workflow: stage,
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
            created_date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let mut store = WorkflowStore::default();
        store.dispatch(Action::SetPageIndex(4));
        assert_eq!(store.table.page_index(), 4);

        store.dispatch(Action::SetPageSize(25));
        assert_eq!(store.table.page_index(), 1);
        assert_eq!(store.table.page_size(), 25);
    }

    #[test]
    fn sort_by_toggles_on_repeat_click() {
        let mut store = WorkflowStore::default();
        store.dispatch(Action::SortBy("total".into()));
        assert_eq!(
            store.table.sort(),
            Some(&SortSpec {
                key: "total".into(),
                order: SortOrder::Asc
            })
        );

        store.dispatch(Action::SortBy("total".into()));
        assert_eq!(store.table.sort().map(|s| s.order), Some(SortOrder::Desc));

        // A different column starts over at ascending.
        store.dispatch(Action::SortBy("order_no".into()));
        assert_eq!(store.table.sort().map(|s| s.order), Some(SortOrder::Asc));
    }

    #[test]
    fn page_loaded_replaces_records_and_clears_loading() {
        let mut store = WorkflowStore {
            loading: true,
            ..Default::default()
        };
        store.dispatch(Action::PageLoaded(EstimatePage {
            records: vec![estimate(1, WorkflowStage::Estimate)],
            total: 37,
        }));
        assert!(!store.loading);
        assert_eq!(store.estimate_list.len(), 1);
        assert_eq!(store.total, 37);
    }

    #[test]
    fn page_failed_clears_loading_but_keeps_records() {
        let mut store = WorkflowStore {
            loading: true,
            estimate_list: vec![estimate(1, WorkflowStage::Invoice)],
            ..Default::default()
        };
        store.dispatch(Action::PageFailed);
        assert!(!store.loading);
        assert_eq!(store.estimate_list.len(), 1);
    }

    #[test]
    fn tab_counts_reflect_loaded_page_only() {
        let store = WorkflowStore {
            estimate_list: vec![
                estimate(1, WorkflowStage::Estimate),
                estimate(2, WorkflowStage::Estimate),
                estimate(3, WorkflowStage::Invoice),
            ],
            total: 99,
            ..Default::default()
        };
        assert_eq!(store.tab_count(WorkflowTab::All), 3);
        assert_eq!(
            store.tab_count(WorkflowTab::Stage(WorkflowStage::Estimate)),
            2
        );
        assert_eq!(
            store.tab_count(WorkflowTab::Stage(WorkflowStage::DroppedOff)),
            0
        );
    }

    #[test]
    fn drawer_open_and_close() {
        let mut store = WorkflowStore::default();
        store.dispatch(Action::OpenDrawer(estimate(7, WorkflowStage::InProgress)));
        assert!(store.drawer_open);
        assert_eq!(store.selected.as_ref().map(|e| e.id), Some(7));

        store.dispatch(Action::CloseDrawer);
        assert!(!store.drawer_open);
        assert_eq!(store.selected, None);
    }

    #[test]
    fn selecting_a_tab_does_not_touch_the_descriptor() {
        let mut store = WorkflowStore::default();
        let before = store.table.generation();
        store.dispatch(Action::SelectTab(WorkflowTab::Stage(
            WorkflowStage::Invoice,
        )));
        assert_eq!(store.table.generation(), before);
        assert_eq!(store.active_tab, WorkflowTab::Stage(WorkflowStage::Invoice));
    }
}
