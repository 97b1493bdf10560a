pub mod contracts;
pub mod database;
pub mod fields;
pub mod invoices;
