//! Bulk catalog import from delimited text.
//!
//! The input is a header row naming `id`, `name`, `price`, and `quantity`
//! columns (in any order, extra columns ignored) followed by one record per
//! line. Fields are trimmed and empty lines skipped; there is no quote
//! handling. Row-level problems are collected into the report rather than
//! aborting the import, so one bad record never blocks the rest of a feed.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::{CatalogItem, CatalogStore};

/// What to do when an imported record's ID already exists in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Leave the existing item untouched. The row still counts as succeeded.
    #[default]
    Skip,
    /// Overwrite the existing item's name, price, and quantity.
    Update,
}

/// Options controlling a bulk import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Duplicate-handling policy.
    pub on_duplicate: DuplicatePolicy,
    /// Field delimiter.
    pub delimiter: char,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            on_duplicate: DuplicatePolicy::Skip,
            delimiter: ',',
        }
    }
}

/// A problem with a single imported row.
///
/// `row` is the 1-based position in the input counting the header, so the
/// first data record is row 2. Row 0 marks an input-level parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Number of data records parsed from the input.
    pub processed: usize,
    /// Records stored, updated, or deliberately skipped as duplicates.
    pub succeeded: usize,
    /// Records rejected by validation or by the store.
    pub failed: usize,
    /// One entry per rejected record.
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// Returns true if every record made it through.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    fn parse_failure(message: String) -> Self {
        Self {
            errors: vec![RowError { row: 0, message }],
            ..Self::default()
        }
    }
}

const REQUIRED_COLUMNS: [&str; 4] = ["id", "name", "price", "quantity"];

struct Header {
    columns: Vec<String>,
}

impl Header {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Imports catalog items from delimited text, one record per line.
#[tracing::instrument(skip(store, input, options), fields(on_duplicate = ?options.on_duplicate))]
pub async fn import_csv<C: CatalogStore>(
    store: &C,
    input: &str,
    options: &ImportOptions,
) -> ImportReport {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = match lines.next() {
        Some(line) => Header {
            columns: split_fields(line, options.delimiter),
        },
        None => return ImportReport::parse_failure("CSV parsing error: missing header row".into()),
    };

    // Parse every record up front; a malformed record aborts the whole
    // import before anything is written.
    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        let row = index + 2;
        let fields = split_fields(line, options.delimiter);
        if fields.len() != header.columns.len() {
            return ImportReport::parse_failure(format!(
                "CSV parsing error: row {row} has {} fields, expected {}",
                fields.len(),
                header.columns.len()
            ));
        }
        records.push((row, fields));
    }

    let mut report = ImportReport {
        processed: records.len(),
        ..ImportReport::default()
    };

    for (row, fields) in records {
        match import_record(store, &header, &fields, options.on_duplicate).await {
            Ok(()) => report.succeeded += 1,
            Err(message) => {
                report.failed += 1;
                report.errors.push(RowError { row, message });
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        "catalog import finished"
    );
    report
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(|f| f.trim().to_string()).collect()
}

async fn import_record<C: CatalogStore>(
    store: &C,
    header: &Header,
    fields: &[String],
    on_duplicate: DuplicatePolicy,
) -> Result<(), String> {
    let field = |name: &str| header.index_of(name).map(|i| fields[i].as_str());

    let id = field("id").unwrap_or("");
    let name = field("name").unwrap_or("");
    if id.is_empty()
        || name.is_empty()
        || REQUIRED_COLUMNS.iter().any(|c| header.index_of(c).is_none())
    {
        return Err(format!(
            "Missing required fields: {}",
            REQUIRED_COLUMNS.join(", ")
        ));
    }

    let price = Money::parse_decimal(field("price").unwrap_or(""))
        .map_err(|_| "Invalid price".to_string())?;
    let quantity = field("quantity")
        .unwrap_or("")
        .parse::<u32>()
        .map_err(|_| "Invalid quantity".to_string())?;

    let item = CatalogItem::new(id, name, price, quantity);
    let store_error = |e: crate::CatalogError| format!("Database error: {e}");

    match store.get(&item.id).await.map_err(store_error)? {
        Some(_) => match on_duplicate {
            DuplicatePolicy::Skip => Ok(()),
            DuplicatePolicy::Update => store.update(item).await.map_err(store_error),
        },
        None => store.insert(item).await.map_err(store_error),
    }
}
