pub mod activity;
pub mod contract;
pub mod fiscal_entity;
pub mod invoice;
pub mod store;
