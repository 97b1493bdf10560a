use crate::{
    models::contract::ServiceContract,
    services::fields::{FieldError, FieldSet, into_fiscal_entity, pop_decimal},
};

/// Builds a contract from `fields`. The contract is not attached to any store
/// until the caller adds it.
pub fn create_contract(mut fields: FieldSet) -> Result<ServiceContract, FieldError> {
    let hourly_rate = pop_decimal(&mut fields, "hourly_rate")?;
    let buyer = into_fiscal_entity(fields)?;

    Ok(ServiceContract { buyer, hourly_rate })
}
