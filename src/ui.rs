use colored::*;
use microinvoicer::models::{
    activity::{ActivityReport, Task},
    fiscal_entity::FiscalEntity,
    invoice::TimeInvoice,
    store::LocalStorage,
};
use rust_decimal::{Decimal, RoundingStrategy};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Render a view header with title and item count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    let noun = if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, noun);
}

/// Render a section header (e.g., "Seller", "Activity")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Pads `left` so that `right` ends at the terminal edge. Falls back to the
/// left part alone when both do not fit.
fn align(left: &str, right: &str, width: usize) -> Option<usize> {
    let total = left.chars().count() + right.chars().count();
    if total + 4 < width {
        Some(width - total - 2)
    } else {
        None
    }
}

fn print_aligned(left: ColoredString, left_plain: &str, right: &str) {
    match align(left_plain, right, get_terminal_width()) {
        Some(padding) => println!("{}{}{}", left, " ".repeat(padding), right.dimmed()),
        None => println!("{}", left),
    }
}

fn render_entity(entity: &FiscalEntity) {
    println!("    {}", entity.name.bold());
    println!("    {}", entity.owner_fullname);
    println!(
        "    {}  ·  {}",
        entity.registration_id.dimmed(),
        entity.fiscal_code.dimmed()
    );
    println!("    {}", entity.address);
    println!(
        "    {} ({})",
        entity.bank_iban_account,
        entity.bank_name.dimmed()
    );
}

/// Seller, numbering series and counters of the database
pub fn render_register(store: &LocalStorage) {
    let register = &store.register;
    render_view_header(&register.seller.name, register.invoices.len(), "invoice");
    println!(
        "  Series {} · next number {} · {} contracts",
        register.invoice_series.bold(),
        register.next_number.to_string().bold(),
        store.contracts.len()
    );
}

pub fn render_contracts(store: &LocalStorage) {
    if store.contracts.is_empty() {
        println!("No contracts");
        return;
    }

    render_view_header("Contracts", store.contracts.len(), "contract");
    for (contract_id, contract) in store.contracts.iter().enumerate() {
        let left = format!("  {:>3}  {}", contract_id, contract.buyer.name);
        let right = format!("{}/h", format_amount(contract.hourly_rate));
        print_aligned(left.bold(), &left, &right);
    }
}

fn invoice_reference(invoice: &TimeInvoice) -> String {
    format!("{}-{}", invoice.series, invoice.number)
}

pub fn render_invoice_line(invoice: &TimeInvoice) {
    let left = format!(
        "  {:>8}  {}  {}",
        invoice_reference(invoice),
        invoice.status,
        invoice.buyer.name
    );
    let right = format!(
        "{}h  ·  {}",
        invoice.billed_hours(),
        format_amount(invoice.converted_amount())
    );
    print_aligned(left.normal(), &left, &right);
}

pub fn render_invoices(store: &LocalStorage) {
    let invoices = &store.register.invoices;
    if invoices.is_empty() {
        println!("No invoices");
        return;
    }

    render_view_header("Invoices", invoices.len(), "invoice");
    for invoice in invoices {
        render_invoice_line(invoice);
    }
}

fn task_line(task: &Task) -> (String, String) {
    let left = format!("  {:>4}h  {}", task.duration, task.name);
    let right = task.start_date.strftime("%a, %b %d").to_string();
    (left, right)
}

fn render_activity(activity: &ActivityReport) {
    render_section_header(&format!(
        "Activity since {} · {} · project {}",
        activity.start_date.strftime("%b %d, %Y"),
        activity.flavor,
        activity.project_id
    ));
    for task in &activity.tasks {
        let (left, right) = task_line(task);
        print_aligned(left.normal(), &left, &right);
    }
}

/// Full invoice with both parties, totals and the activity report it bills
pub fn render_invoice(invoice: &TimeInvoice) {
    println!(
        "\n  {} {}\n",
        invoice_reference(invoice).cyan().bold(),
        invoice.status.to_string().yellow()
    );

    render_section_header("Seller");
    render_entity(&invoice.seller);
    render_section_header("Buyer");
    render_entity(&invoice.buyer);

    render_activity(&invoice.activity);

    render_section_header("Total");
    println!(
        "    {}h × {} = {}",
        invoice.billed_hours(),
        format_amount(invoice.hourly_rate),
        format_amount(invoice.amount())
    );
    println!(
        "    × {} = {}",
        invoice.conversion_rate,
        format_amount(invoice.converted_amount()).bold()
    );
}
