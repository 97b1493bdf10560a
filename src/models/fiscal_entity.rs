use serde::{Deserialize, Serialize};

/// Identity of a seller or a buyer as it appears on an invoice.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FiscalEntity {
    /// Legal name of the company
    pub name: String,
    /// Full name of the person representing the company
    pub owner_fullname: String,
    /// Trade register identifier
    pub registration_id: String,
    /// Tax identification code
    pub fiscal_code: String,
    /// Registered address
    pub address: String,
    /// IBAN of the account receiving payments
    pub bank_iban_account: String,
    /// Name of the bank holding the account
    pub bank_name: String,
}
