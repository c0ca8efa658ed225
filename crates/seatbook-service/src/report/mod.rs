//! Reporting over the reservation cache and the canceled ledger.

pub mod sales;

pub use sales::{SalesRecord, SalesReportService};
