//! Data layer for search criteria, results and export
//!
//! This module holds the plain records exchanged with the business search
//! API, the client-local selection set, and CSV serialisation of leads.

pub mod business;
pub mod data_exporter;
pub mod selection;
