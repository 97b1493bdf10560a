use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::*;
use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;

use microinvoicer::{
    logging::init_cli_logger,
    models::store::LocalStorage,
    services::{
        contracts::create_contract, database::create_empty_db, fields::FieldSet,
        invoices::draft_time_invoice,
    },
    storage::{Storage, json::JsonFileStorage},
};

mod ui;

#[derive(Parser)]
#[command(
    name = "microinvoicer",
    about = "Drafts freelance time invoices backed by random activity reports"
)]
struct Cli {
    /// Path of the database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Seed for the random activity generator
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database for a seller
    Init {
        #[command(flatten)]
        seller: EntityArgs,

        /// Invoice numbering series
        #[arg(long)]
        invoice_series: String,

        /// Number of the first invoice
        #[arg(long, default_value_t = 1)]
        start_no: u64,
    },

    /// Manage contracts
    #[command(subcommand)]
    Contract(ContractCommands),

    /// Manage invoices
    #[command(subcommand)]
    Invoice(InvoiceCommands),
}

#[derive(Subcommand)]
enum ContractCommands {
    /// Add a contract with a buyer
    New {
        #[command(flatten)]
        buyer: EntityArgs,

        /// Hourly rate billed to the buyer
        #[arg(long)]
        hourly_rate: String,
    },
    /// List all contracts
    List,
}

#[derive(Subcommand)]
enum InvoiceCommands {
    /// Draft an invoice for last month
    Draft {
        /// Contract number as shown by `contract list`
        #[arg(long)]
        contract_id: usize,

        /// Billed hours
        #[arg(long)]
        duration: u32,

        /// Technology theme of the generated tasks
        #[arg(long)]
        flavor: String,

        #[arg(long)]
        project_id: u64,

        /// Exchange rate applied to the invoice total
        #[arg(long)]
        xchg_rate: String,
    },
    /// List all invoices
    List,
    /// Show an invoice with its activity report
    Show { number: u64 },
}

#[derive(Args)]
struct EntityArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    owner_fullname: String,
    #[arg(long)]
    registration_id: String,
    #[arg(long)]
    fiscal_code: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    bank_iban_account: String,
    #[arg(long)]
    bank_name: String,
}

impl EntityArgs {
    fn into_fields(self) -> FieldSet {
        let mut fields = FieldSet::new();
        for (key, value) in [
            ("name", self.name),
            ("owner_fullname", self.owner_fullname),
            ("registration_id", self.registration_id),
            ("fiscal_code", self.fiscal_code),
            ("address", self.address),
            ("bank_iban_account", self.bank_iban_account),
            ("bank_name", self.bank_name),
        ] {
            fields.insert(key.to_string(), Value::String(value));
        }
        fields
    }
}

fn exit_with_error(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red(), message);
    std::process::exit(1);
}

fn save_or_exit(storage: &JsonFileStorage, store: &LocalStorage) {
    if let Err(e) = storage.save(store) {
        exit_with_error(format!("Failed to save store: {}", e));
    }
}

fn require_store(existing: Option<LocalStorage>) -> LocalStorage {
    existing.unwrap_or_else(|| {
        exit_with_error("No database yet, create one with `microinvoicer init`")
    })
}

fn main() {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let storage_path = cli.db.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("microinvoicer")
            .join("store.json")
    });

    if let Some(parent) = storage_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            exit_with_error(format!("Failed to create data directory: {}", e))
        });
    }

    let storage = JsonFileStorage::new(storage_path);

    let existing = match storage.load() {
        Ok(existing) => existing,
        Err(e) => exit_with_error(format!("Failed to load store: {}", e)),
    };

    let command = match cli.command {
        Some(command) => command,
        None => {
            match existing {
                Some(store) => ui::render_register(&store),
                None => println!("No database yet, create one with `microinvoicer init`"),
            }
            return;
        }
    };

    match command {
        Commands::Init {
            seller,
            invoice_series,
            start_no,
        } => {
            if existing.is_some() {
                exit_with_error(format!(
                    "A database already exists at '{}'",
                    storage.path().display()
                ));
            }

            let mut fields = seller.into_fields();
            fields.insert("invoice_series".into(), Value::from(invoice_series));
            fields.insert("start_no".into(), Value::from(start_no));

            let store = create_empty_db(fields).unwrap_or_else(|e| exit_with_error(e));
            save_or_exit(&storage, &store);
            println!("{} {}", "Created".green(), storage.path().display());
            ui::render_register(&store);
        }
        Commands::Contract(ContractCommands::New { buyer, hourly_rate }) => {
            let mut fields = buyer.into_fields();
            fields.insert("hourly_rate".into(), Value::from(hourly_rate));

            let contract = create_contract(fields).unwrap_or_else(|e| exit_with_error(e));
            let mut store = require_store(existing);
            let buyer_name = contract.buyer.name.clone();
            let contract_id = store.add_contract(contract);
            save_or_exit(&storage, &store);

            println!(
                "{} contract {} with {}",
                "Added".green(),
                format!("#{}", contract_id).bold(),
                buyer_name
            );
        }
        Commands::Contract(ContractCommands::List) => {
            ui::render_contracts(&require_store(existing))
        }
        Commands::Invoice(InvoiceCommands::Draft {
            contract_id,
            duration,
            flavor,
            project_id,
            xchg_rate,
        }) => {
            let mut fields = FieldSet::new();
            fields.insert("contract_id".into(), Value::from(contract_id));
            fields.insert("duration".into(), Value::from(duration));
            fields.insert("flavor".into(), Value::from(flavor));
            fields.insert("project_id".into(), Value::from(project_id));
            fields.insert("xchg_rate".into(), Value::from(xchg_rate));

            let mut store = require_store(existing);
            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let today = jiff::Zoned::now().date();

            let invoice = draft_time_invoice(&mut store, fields, &mut rng, today)
                .unwrap_or_else(|e| exit_with_error(e))
                .clone();
            save_or_exit(&storage, &store);

            ui::render_invoice(&invoice);
        }
        Commands::Invoice(InvoiceCommands::List) => {
            ui::render_invoices(&require_store(existing))
        }
        Commands::Invoice(InvoiceCommands::Show { number }) => {
            let store = require_store(existing);
            match store.invoice(number) {
                Some(invoice) => ui::render_invoice(invoice),
                None => exit_with_error(format!("Invoice #{} not found", number)),
            }
        }
    }
}
