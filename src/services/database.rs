use tracing::info;

use crate::{
    models::{invoice::InvoiceRegister, store::LocalStorage},
    services::fields::{FieldError, FieldSet, into_fiscal_entity, pop_integer, pop_string},
};

/// Creates a database for the seller described by `fields`, numbering
/// invoices in `invoice_series` from `start_no` on.
pub fn create_empty_db(mut fields: FieldSet) -> Result<LocalStorage, FieldError> {
    let invoice_series = pop_string(&mut fields, "invoice_series")?;
    let start_no: u64 = pop_integer(&mut fields, "start_no")?;
    let seller = into_fiscal_entity(fields)?;

    info!(series = %invoice_series, start_no, "Created empty database");

    Ok(LocalStorage::new(InvoiceRegister::new(
        seller,
        invoice_series,
        start_no,
    )))
}
