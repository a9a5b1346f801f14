//! # CSV Export
//!
//! Renders the visible rows of a table as CSV.
//!
//! ## Format
//! ```text
//! "Product Name","Category","Quantity"        ◄── header row, fixed per table
//! "Drill ""Pro""","Tools","3"                 ◄── every field quoted,
//! "Cement","Building","40"                        embedded quotes doubled
//! ```
//!
//! Rows end with `\n`. Amounts use the same `RWF 1,500` rendering as the
//! tables, and a missing amount is written as `–`.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Branch, Employee, RestoredProduct, SoldProduct, StoreProduct};

/// A table that can be exported.
pub trait CsvTable {
    /// Suggested download file name.
    const FILE_NAME: &'static str;
    /// Header row, in column order.
    const HEADERS: &'static [&'static str];

    /// One record, same length and order as `HEADERS`.
    fn record(&self) -> Vec<String>;
}

/// Writes `rows` as CSV into `writer`.
pub fn write_csv<T: CsvTable, W: Write>(rows: &[T], writer: W) -> CoreResult<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(T::HEADERS)?;
    for row in rows {
        wtr.write_record(row.record())?;
    }
    wtr.flush().map_err(|e| CoreError::Export(e.to_string()))
}

/// Renders `rows` as a CSV string.
///
/// ```rust
/// use tally_core::export::to_csv;
/// use tally_core::types::Branch;
///
/// let branch = Branch {
///     id: "b1".into(),
///     name: "Remera \"East\"".into(),
///     district: "Gasabo".into(),
///     sector: "Remera".into(),
///     cell: "Rukiri".into(),
///     village: "Amahoro".into(),
///     created_at: None,
/// };
/// let csv = to_csv(&[branch]).unwrap();
/// assert_eq!(
///     csv,
///     "\"Branch Name\",\"District\",\"Sector\",\"Cell\",\"Village\"\n\
///      \"Remera \"\"East\"\"\",\"Gasabo\",\"Remera\",\"Rukiri\",\"Amahoro\"\n"
/// );
/// ```
pub fn to_csv<T: CsvTable>(rows: &[T]) -> CoreResult<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CoreError::Export(e.to_string()))
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// =============================================================================
// Table Implementations
// =============================================================================

impl CsvTable for StoreProduct {
    const FILE_NAME: &'static str = "store_products.csv";
    const HEADERS: &'static [&'static str] = &[
        "Product Name",
        "Category",
        "Brand",
        "Model",
        "Color",
        "Condition",
        "Quantity",
        "Unit",
        "Branch",
        "Cost Price",
        "Selling Price",
        "Status",
        "Expiry Date",
        "Supplier",
        "Barcode",
        "Last Updated",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.category.clone(),
            opt(&self.brand),
            opt(&self.model),
            opt(&self.color),
            opt(&self.condition),
            self.quantity.value.to_string(),
            self.quantity.unit.to_string(),
            self.branch.clone(),
            self.cost_price.to_string(),
            Money::format_optional(self.selling_price),
            self.status.to_string(),
            self.expiry_date.map(|d| d.to_string()).unwrap_or_default(),
            opt(&self.supplier),
            opt(&self.barcode),
            self.last_updated.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }
}

impl CsvTable for RestoredProduct {
    const FILE_NAME: &'static str = "restored_products.csv";
    const HEADERS: &'static [&'static str] = &[
        "Product Name",
        "Category",
        "Model/Variant",
        "Quantity",
        "Branch",
        "Status",
        "Cost Price",
        "Selling Price",
        "Total Amount",
        "Date Added",
        "Restore Comment",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.category.clone(),
            opt(&self.model),
            self.quantity.to_string(),
            self.branch.name.clone(),
            self.status.to_string(),
            self.cost_price.to_string(),
            Money::format_optional(self.selling_price),
            Money::format_optional(self.total_amount()),
            self.created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            opt(&self.restore_comment),
        ]
    }
}

impl CsvTable for SoldProduct {
    const FILE_NAME: &'static str = "sold_products.csv";
    const HEADERS: &'static [&'static str] = &[
        "Product Name",
        "Category",
        "Quantity",
        "Unit",
        "Branch",
        "Cost Price",
        "Selling Price",
        "Total Amount",
        "Amount Paid",
        "Balance Due",
        "Payment Status",
        "Payment Method",
        "Customer",
        "Sold Date",
        "Due Date",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.category.clone(),
            self.quantity.value.to_string(),
            self.quantity.unit.to_string(),
            self.branch.clone(),
            self.cost_price.to_string(),
            Money::format_optional(self.selling_price),
            self.total_amount_to_pay.to_string(),
            self.amount_paid.to_string(),
            self.balance_due.to_string(),
            self.payment_status.to_string(),
            self.payment_method.to_string(),
            opt(&self.customer_name),
            self.sold_date.format("%Y-%m-%d").to_string(),
            self.due_date.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

impl CsvTable for Branch {
    const FILE_NAME: &'static str = "branches.csv";
    const HEADERS: &'static [&'static str] = &["Branch Name", "District", "Sector", "Cell", "Village"];

    fn record(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.district.clone(),
            self.sector.clone(),
            self.cell.clone(),
            self.village.clone(),
        ]
    }
}

impl CsvTable for Employee {
    const FILE_NAME: &'static str = "employees.csv";
    const HEADERS: &'static [&'static str] = &[
        "Username",
        "First Name",
        "Last Name",
        "Email",
        "Phone",
        "Role",
        "Branch",
        "Status",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.role.to_string(),
            self.branch_name().unwrap_or("Unassigned").to_string(),
            if self.is_active { "Active" } else { "Inactive" }.to_string(),
        ]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
