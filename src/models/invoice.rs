use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{activity::ActivityReport, fiscal_entity::FiscalEntity};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Draft,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "DRAFT"),
        }
    }
}

/// An invoice billing the hours of an activity report.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimeInvoice {
    pub status: InvoiceStatus,
    pub seller: FiscalEntity,
    /// Numbering namespace copied from the register at draft time
    pub series: String,
    pub number: u64,
    pub buyer: FiscalEntity,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub hourly_rate: Decimal,
    pub activity: ActivityReport,
    /// Exchange rate from the contract currency to the invoicing currency
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub conversion_rate: Decimal,
}

impl TimeInvoice {
    pub fn billed_hours(&self) -> u32 {
        self.activity.total_hours()
    }

    /// Amount in the contract currency.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.billed_hours()) * self.hourly_rate
    }

    /// Amount in the invoicing currency.
    pub fn converted_amount(&self) -> Decimal {
        self.amount() * self.conversion_rate
    }
}

/// Sequentially numbered invoices issued by one seller.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct InvoiceRegister {
    pub seller: FiscalEntity,
    pub invoice_series: String,
    /// Number the next drafted invoice receives. Only ever incremented.
    pub next_number: u64,
    /// Append-only
    pub invoices: Vec<TimeInvoice>,
}

impl InvoiceRegister {
    pub fn new(seller: FiscalEntity, invoice_series: String, start_no: u64) -> Self {
        Self {
            seller,
            invoice_series,
            next_number: start_no,
            invoices: vec![],
        }
    }

    /// Records a drafted invoice and consumes its number.
    pub fn commit(&mut self, invoice: TimeInvoice) -> &TimeInvoice {
        self.next_number += 1;
        self.invoices.push(invoice);
        &self.invoices[self.invoices.len() - 1]
    }
}
