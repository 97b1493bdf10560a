use serde::Serialize;

use crate::models::{
    contract::ServiceContract,
    invoice::{InvoiceRegister, TimeInvoice},
};

/// Everything persisted for one database: the invoice register and the
/// contracts invoices are drafted against.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LocalStorage {
    pub register: InvoiceRegister,
    pub contracts: Vec<ServiceContract>,
}

impl LocalStorage {
    pub fn new(register: InvoiceRegister) -> Self {
        Self {
            register,
            contracts: vec![],
        }
    }

    /// Appends a contract and returns the index it is addressed by.
    pub fn add_contract(&mut self, contract: ServiceContract) -> usize {
        self.contracts.push(contract);
        self.contracts.len() - 1
    }

    pub fn contract(&self, contract_id: usize) -> Option<&ServiceContract> {
        self.contracts.get(contract_id)
    }

    pub fn invoice(&self, number: u64) -> Option<&TimeInvoice> {
        self.register.invoices.iter().find(|i| i.number == number)
    }
}
