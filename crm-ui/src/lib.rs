pub mod app;
pub mod forms;
pub mod logging;
pub mod screens;
pub mod store;
pub mod tasks;
pub mod utils;
