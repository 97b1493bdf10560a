use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::fiscal_entity::FiscalEntity;

/// A buyer billed at a fixed hourly rate. Contracts have no id of their own,
/// they are addressed by their position in the store.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServiceContract {
    pub buyer: FiscalEntity,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub hourly_rate: Decimal,
}
