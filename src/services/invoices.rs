use jiff::civil::Date;
use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::{
    generator::{
        GeneratorError,
        activity::{ActivityParameters, create_random_activity},
    },
    models::{
        invoice::{InvoiceStatus, TimeInvoice},
        store::LocalStorage,
    },
    services::fields::{FieldError, FieldSet, pop_decimal, pop_integer, pop_string},
};

#[derive(Debug, Error)]
pub enum DraftInvoiceError {
    #[error(transparent)]
    Fields(#[from] FieldError),

    #[error("Contract #{0} not found")]
    ContractNotFound(usize),

    #[error("Failed to generate activity: {0}")]
    Generator(#[from] GeneratorError),
}

/// Builds a draft invoice for the contract named in `fields`, billing a
/// random activity report from last month. The store is left untouched.
pub fn create_time_invoice<R: Rng + ?Sized>(
    store: &LocalStorage,
    mut fields: FieldSet,
    rng: &mut R,
    today: Date,
) -> Result<TimeInvoice, DraftInvoiceError> {
    let contract_id: usize = pop_integer(&mut fields, "contract_id")?;
    let duration: u32 = pop_integer(&mut fields, "duration")?;
    let flavor = pop_string(&mut fields, "flavor")?;
    let project_id: u64 = pop_integer(&mut fields, "project_id")?;
    let conversion_rate = pop_decimal(&mut fields, "xchg_rate")?;

    let contract = store
        .contract(contract_id)
        .ok_or(DraftInvoiceError::ContractNotFound(contract_id))?;

    let activity = create_random_activity(
        rng,
        today,
        ActivityParameters {
            contract_id,
            hours: duration,
            flavor,
            project_id,
        },
    )?;

    Ok(TimeInvoice {
        status: InvoiceStatus::Draft,
        seller: store.register.seller.clone(),
        series: store.register.invoice_series.clone(),
        number: store.register.next_number,
        buyer: contract.buyer.clone(),
        hourly_rate: contract.hourly_rate,
        activity,
        conversion_rate,
    })
}

/// Drafts an invoice and records it in the register, consuming the next
/// invoice number. Nothing changes when drafting fails.
pub fn draft_time_invoice<'a, R: Rng + ?Sized>(
    store: &'a mut LocalStorage,
    fields: FieldSet,
    rng: &mut R,
    today: Date,
) -> Result<&'a TimeInvoice, DraftInvoiceError> {
    let invoice = create_time_invoice(store, fields, rng, today)?;
    let invoice = store.register.commit(invoice);

    info!(
        series = %invoice.series,
        number = invoice.number,
        hours = invoice.billed_hours(),
        "Drafted time invoice"
    );

    Ok(invoice)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rand::{SeedableRng, rngs::StdRng};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        models::{contract::ServiceContract, invoice::InvoiceRegister},
        services::{
            contracts::create_contract,
            test_support::{entity_fields, field_set},
        },
    };

    fn today() -> Date {
        date(2026, 10, 16)
    }

    fn store_with_contract() -> LocalStorage {
        let seller = crate::services::fields::into_fiscal_entity(entity_fields("Seller")).unwrap();
        let mut store = LocalStorage::new(InvoiceRegister::new(seller, String::from("MI"), 10));

        let mut fields = entity_fields("Buyer");
        fields.insert("hourly_rate".into(), Value::from(45));
        let contract: ServiceContract = create_contract(fields).unwrap();
        store.add_contract(contract);

        store
    }

    fn draft_fields(contract_id: usize) -> FieldSet {
        field_set(json!({
            "contract_id": contract_id.to_string(),
            "duration": 160,
            "flavor": "Rust",
            "project_id": 7,
            "xchg_rate": "4.75",
        }))
    }

    #[test]
    fn test_create_time_invoice_snapshots_store() {
        let store = store_with_contract();
        let mut rng = StdRng::seed_from_u64(1);

        let invoice = create_time_invoice(&store, draft_fields(0), &mut rng, today()).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.seller, store.register.seller);
        assert_eq!(invoice.series, "MI");
        assert_eq!(invoice.number, 10);
        assert_eq!(invoice.buyer.name, "Buyer");
        assert_eq!(invoice.hourly_rate, Decimal::new(45, 0));
        assert_eq!(invoice.conversion_rate, Decimal::new(475, 2));
        assert_eq!(invoice.activity.contract_id, 0);
        assert_eq!(invoice.activity.project_id, 7);
        assert_eq!(invoice.activity.start_date, date(2026, 9, 1));
        assert_eq!(invoice.billed_hours(), 160);
        assert_eq!(store.register.next_number, 10);
        assert!(store.register.invoices.is_empty());
    }

    #[test]
    fn test_draft_time_invoice_commits_once() {
        let mut store = store_with_contract();
        let mut rng = StdRng::seed_from_u64(2);

        let first = draft_time_invoice(&mut store, draft_fields(0), &mut rng, today())
            .unwrap()
            .number;
        let second = draft_time_invoice(&mut store, draft_fields(0), &mut rng, today())
            .unwrap()
            .number;

        assert_eq!((first, second), (10, 11));
        assert_eq!(store.register.next_number, 12);
        assert_eq!(store.register.invoices.len(), 2);
        assert_eq!(store.invoice(11).map(|i| i.number), Some(11));
    }

    #[test]
    fn test_draft_unknown_contract_leaves_store_untouched() {
        let mut store = store_with_contract();
        let before = store.clone();
        let mut rng = StdRng::seed_from_u64(3);

        let result = draft_time_invoice(&mut store, draft_fields(4), &mut rng, today());

        assert!(matches!(result, Err(DraftInvoiceError::ContractNotFound(4))));
        assert_eq!(store, before);
    }

    #[test]
    fn test_draft_with_too_few_hours_fails() {
        let mut store = store_with_contract();
        let mut fields = draft_fields(0);
        fields.insert("duration".into(), Value::from(4));
        let mut rng = StdRng::seed_from_u64(3);

        let result = draft_time_invoice(&mut store, fields, &mut rng, today());

        assert!(matches!(
            result,
            Err(DraftInvoiceError::Generator(GeneratorError::ArithmeticInvariant { .. }))
        ));
        assert_eq!(store.register.next_number, 10);
    }

    #[test]
    fn test_draft_missing_field() {
        let mut store = store_with_contract();
        let mut fields = draft_fields(0);
        fields.remove("flavor");
        let mut rng = StdRng::seed_from_u64(3);

        assert!(matches!(
            draft_time_invoice(&mut store, fields, &mut rng, today()),
            Err(DraftInvoiceError::Fields(FieldError::Missing(field))) if field == "flavor"
        ));
    }

    #[test]
    fn test_drafted_store_round_trips() {
        let mut store = store_with_contract();
        let mut rng = StdRng::seed_from_u64(4);
        draft_time_invoice(&mut store, draft_fields(0), &mut rng, today()).unwrap();

        let content = crate::storage::codec::dumps(&store).unwrap();
        let loaded = crate::storage::codec::loads(&content).unwrap().unwrap();

        assert_eq!(loaded.register, store.register);
        assert_eq!(loaded.contracts, store.contracts);
    }
}
