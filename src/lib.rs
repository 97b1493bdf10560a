//! Synthetic freelance invoicing data: fiscal entities, service contracts,
//! random activity reports and the time invoices billing them, kept as a
//! single JSON document.

pub mod generator;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
