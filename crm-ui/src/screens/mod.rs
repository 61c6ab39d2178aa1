mod customer_form;
mod workflow_table;

pub use customer_form::CustomerFormScreen;
pub use workflow_table::WorkflowTableScreen;
