//! User interface layer
//!
//! The search page state machine, its form and results table, and the
//! terminal application that ties them together.

pub mod page_controller;
pub mod results_table;
pub mod search_form;
pub mod tui_app;
