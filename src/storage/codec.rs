//! JSON encoding of a [`LocalStorage`].
//!
//! Encoding goes through serde: records become objects with their fields in
//! declaration order, dates become `YYYY-MM-DD` strings and decimals become
//! JSON floats. The decimal conversion is lossy; amounts that are not
//! representable as `f64` come back rounded.
//!
//! Decoding rebuilds the typed graph bottom-up. Object members whose key is
//! listed in [`CONSTRUCTORS`] are turned into records, once per element when
//! the member is an array, every other member is kept as plain data for the
//! enclosing record to pick from.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, ser::PrettyFormatter};
use tracing::{debug, warn};

use crate::{
    models::{
        activity::{ActivityReport, Task},
        contract::ServiceContract,
        fiscal_entity::FiscalEntity,
        invoice::{InvoiceRegister, TimeInvoice},
        store::LocalStorage,
    },
    storage::StorageError,
};

const INDENT: &[u8] = b"    ";
const ROOT: &str = "<root>";

type Constructor = fn(Fields) -> Result<Record, StorageError>;

/// Member key to record constructor.
const CONSTRUCTORS: &[(&str, Constructor)] = &[
    ("seller", build_fiscal_entity),
    ("buyer", build_fiscal_entity),
    ("register", build_register),
    ("activity", build_activity),
    ("contracts", build_contract),
    ("tasks", build_task),
    ("invoices", build_invoice),
];

fn constructor_for(key: &str) -> Option<Constructor> {
    CONSTRUCTORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, constructor)| *constructor)
}

pub fn dumps(store: &LocalStorage) -> Result<String, StorageError> {
    to_pretty_json(store)
}

/// Pretty-prints `value`. A failure names the type handed in here; the
/// serde_json message says what inside it could not be encoded.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));

    value
        .serialize(&mut serializer)
        .map_err(|source| StorageError::SerializeFailed {
            type_name: std::any::type_name::<T>(),
            source,
        })?;

    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Returns `Ok(None)` when `content` is not JSON at all, and an error when it
/// is JSON of the wrong shape.
pub fn loads(content: &str) -> Result<Option<LocalStorage>, StorageError> {
    let data: Value = match serde_json::from_str(content) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Stored content is not valid JSON");
            return Ok(None);
        }
    };

    let Node::Object(members) = rebuild(data)? else {
        return Err(StorageError::UnexpectedShape {
            field: ROOT.to_string(),
            expected: "an object",
        });
    };

    let mut root = Fields::new(ROOT, members);
    let register = root.record("register", Record::into_register)?;
    let contracts = root.records("contracts", Record::into_contract)?;

    if !root.members.is_empty() {
        let discarded: Vec<_> = root.members.keys().collect();
        debug!(?discarded, "Discarded unknown top-level keys");
    }

    Ok(Some(LocalStorage {
        register,
        contracts,
    }))
}

/// A JSON value on its way back to the typed graph.
enum Node {
    Plain(Value),
    Object(BTreeMap<String, Node>),
    Array(Vec<Node>),
    Record(Record),
}

impl Node {
    /// Plain data back to JSON, `None` if a record is found inside.
    fn into_value(self) -> Option<Value> {
        match self {
            Node::Plain(value) => Some(value),
            Node::Object(members) => members
                .into_iter()
                .map(|(key, node)| node.into_value().map(|value| (key, value)))
                .collect::<Option<Map<_, _>>>()
                .map(Value::Object),
            Node::Array(items) => items
                .into_iter()
                .map(Node::into_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Node::Record(_) => None,
        }
    }
}

enum Record {
    FiscalEntity(FiscalEntity),
    Register(InvoiceRegister),
    Activity(ActivityReport),
    Contract(ServiceContract),
    Task(Task),
    Invoice(TimeInvoice),
}

impl Record {
    fn into_fiscal_entity(self) -> Option<FiscalEntity> {
        match self {
            Record::FiscalEntity(entity) => Some(entity),
            _ => None,
        }
    }

    fn into_register(self) -> Option<InvoiceRegister> {
        match self {
            Record::Register(register) => Some(register),
            _ => None,
        }
    }

    fn into_activity(self) -> Option<ActivityReport> {
        match self {
            Record::Activity(activity) => Some(activity),
            _ => None,
        }
    }

    fn into_contract(self) -> Option<ServiceContract> {
        match self {
            Record::Contract(contract) => Some(contract),
            _ => None,
        }
    }

    fn into_task(self) -> Option<Task> {
        match self {
            Record::Task(task) => Some(task),
            _ => None,
        }
    }

    fn into_invoice(self) -> Option<TimeInvoice> {
        match self {
            Record::Invoice(invoice) => Some(invoice),
            _ => None,
        }
    }
}

fn rebuild(value: Value) -> Result<Node, StorageError> {
    match value {
        Value::Object(members) => {
            let mut rebuilt = BTreeMap::new();
            for (key, member) in members {
                let child = rebuild(member)?;
                let node = match constructor_for(&key) {
                    Some(constructor) => construct(&key, constructor, child)?,
                    None => child,
                };
                rebuilt.insert(key, node);
            }
            Ok(Node::Object(rebuilt))
        }
        Value::Array(items) => items
            .into_iter()
            .map(rebuild)
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array),
        scalar => Ok(Node::Plain(scalar)),
    }
}

fn construct(key: &str, constructor: Constructor, node: Node) -> Result<Node, StorageError> {
    let unexpected = || StorageError::UnexpectedShape {
        field: key.to_string(),
        expected: "an object or an array of objects",
    };

    match node {
        Node::Object(members) => constructor(Fields::new(key, members)).map(Node::Record),
        Node::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Node::Object(members) => constructor(Fields::new(key, members)).map(Node::Record),
                _ => Err(unexpected()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array),
        _ => Err(unexpected()),
    }
}

/// Members of one object being turned into a record. Constructors take the
/// members they need; whatever is left over is an unknown field.
struct Fields {
    record: String,
    members: BTreeMap<String, Node>,
}

impl Fields {
    fn new(record: &str, members: BTreeMap<String, Node>) -> Self {
        Self {
            record: record.to_string(),
            members,
        }
    }

    fn take(&mut self, field: &str) -> Result<Node, StorageError> {
        self.members
            .remove(field)
            .ok_or_else(|| StorageError::MissingField {
                record: self.record.clone(),
                field: field.to_string(),
            })
    }

    fn plain(&mut self, field: &str) -> Result<Value, StorageError> {
        self.take(field)?
            .into_value()
            .ok_or_else(|| StorageError::UnexpectedShape {
                field: field.to_string(),
                expected: "plain data",
            })
    }

    fn invalid(&self, field: &str, source: serde_json::Error) -> StorageError {
        StorageError::InvalidField {
            record: self.record.clone(),
            field: field.to_string(),
            source,
        }
    }

    fn value<T: DeserializeOwned>(&mut self, field: &str) -> Result<T, StorageError> {
        let value = self.plain(field)?;
        serde_json::from_value(value).map_err(|source| self.invalid(field, source))
    }

    fn decimal(&mut self, field: &str) -> Result<Decimal, StorageError> {
        let value = self.plain(field)?;
        rust_decimal::serde::float::deserialize(value).map_err(|source| self.invalid(field, source))
    }

    fn record<T>(
        &mut self,
        field: &str,
        pick: fn(Record) -> Option<T>,
    ) -> Result<T, StorageError> {
        let mismatch = || StorageError::UnexpectedShape {
            field: field.to_string(),
            expected: "a single record",
        };

        match self.take(field)? {
            Node::Record(record) => pick(record).ok_or_else(mismatch),
            _ => Err(mismatch()),
        }
    }

    /// A lone record is read as a list of one.
    fn records<T>(
        &mut self,
        field: &str,
        pick: fn(Record) -> Option<T>,
    ) -> Result<Vec<T>, StorageError> {
        let mismatch = || StorageError::UnexpectedShape {
            field: field.to_string(),
            expected: "a list of records",
        };

        match self.take(field)? {
            Node::Record(record) => pick(record).map(|r| vec![r]).ok_or_else(mismatch),
            Node::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Node::Record(record) => pick(record).ok_or_else(mismatch),
                    _ => Err(mismatch()),
                })
                .collect(),
            _ => Err(mismatch()),
        }
    }

    fn finish(self) -> Result<(), StorageError> {
        match self.members.into_keys().next() {
            Some(field) => Err(StorageError::UnknownField {
                record: self.record,
                field,
            }),
            None => Ok(()),
        }
    }

    /// Deserializes a record made of plain data only.
    fn into_plain_record<T: DeserializeOwned>(self) -> Result<T, StorageError> {
        let record = self.record;
        let value = Node::Object(self.members)
            .into_value()
            .ok_or_else(|| StorageError::UnexpectedShape {
                field: record.clone(),
                expected: "plain data",
            })?;

        serde_json::from_value(value).map_err(|source| StorageError::InvalidRecord { record, source })
    }
}

fn build_fiscal_entity(fields: Fields) -> Result<Record, StorageError> {
    fields.into_plain_record().map(Record::FiscalEntity)
}

fn build_task(fields: Fields) -> Result<Record, StorageError> {
    fields.into_plain_record().map(Record::Task)
}

fn build_contract(mut fields: Fields) -> Result<Record, StorageError> {
    let contract = ServiceContract {
        buyer: fields.record("buyer", Record::into_fiscal_entity)?,
        hourly_rate: fields.decimal("hourly_rate")?,
    };
    fields.finish()?;
    Ok(Record::Contract(contract))
}

fn build_activity(mut fields: Fields) -> Result<Record, StorageError> {
    let activity = ActivityReport {
        contract_id: fields.value("contract_id")?,
        start_date: fields.value("start_date")?,
        flavor: fields.value("flavor")?,
        project_id: fields.value("project_id")?,
        tasks: fields.records("tasks", Record::into_task)?,
    };
    fields.finish()?;
    Ok(Record::Activity(activity))
}

fn build_invoice(mut fields: Fields) -> Result<Record, StorageError> {
    let invoice = TimeInvoice {
        status: fields.value("status")?,
        seller: fields.record("seller", Record::into_fiscal_entity)?,
        series: fields.value("series")?,
        number: fields.value("number")?,
        buyer: fields.record("buyer", Record::into_fiscal_entity)?,
        hourly_rate: fields.decimal("hourly_rate")?,
        activity: fields.record("activity", Record::into_activity)?,
        conversion_rate: fields.decimal("conversion_rate")?,
    };
    fields.finish()?;
    Ok(Record::Invoice(invoice))
}

fn build_register(mut fields: Fields) -> Result<Record, StorageError> {
    let register = InvoiceRegister {
        seller: fields.record("seller", Record::into_fiscal_entity)?,
        invoice_series: fields.value("invoice_series")?,
        next_number: fields.value("next_number")?,
        invoices: fields.records("invoices", Record::into_invoice)?,
    };
    fields.finish()?;
    Ok(Record::Register(register))
}
