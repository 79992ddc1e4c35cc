use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// One position from the holdings source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Bare security code, not venue-qualified
    pub code: String,

    /// Number of shares/units held
    pub quantity: f64,

    /// Average acquisition cost per share
    pub average_cost: f64,

    /// Optional category label (sector, strategy bucket, ...)
    #[serde(default)]
    pub category: Option<String>,
}

impl Holding {
    pub fn new(code: impl Into<String>, quantity: f64, average_cost: f64) -> Self {
        Self {
            code: code.into(),
            quantity,
            average_cost,
            category: None,
        }
    }

    /// Total acquisition cost of the position
    pub fn total_cost(&self) -> f64 {
        self.average_cost * self.quantity
    }
}

/// Load holdings from a CSV file with columns: code,quantity,average_cost,category
///
/// Malformed rows are skipped with a warning rather than failing the load;
/// a bad spreadsheet export must not take the whole valuation down.
pub fn load_holdings<P: AsRef<Path>>(path: P) -> crate::error::Result<Vec<Holding>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path.as_ref())
        .map_err(|e| {
            crate::error::AppError::Io(format!(
                "Failed to open holdings file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

    let mut holdings = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(row = idx + 1, error = %e, "Skipping unreadable holdings row");
                continue;
            }
        };

        let code = match record.get(0) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                warn!(row = idx + 1, "Skipping holdings row without a code");
                continue;
            }
        };

        let quantity = parse_numeric_field(&record, 1, "quantity", idx + 1);
        let average_cost = parse_numeric_field(&record, 2, "average_cost", idx + 1);

        if quantity < 0.0 || average_cost < 0.0 {
            warn!(row = idx + 1, code = %code, "Skipping holdings row with negative values");
            continue;
        }

        let category = record
            .get(3)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string());

        holdings.push(Holding {
            code,
            quantity,
            average_cost,
            category,
        });
    }

    Ok(holdings)
}

/// A missing or blank cell defaults to 0 quietly (a holdings export without a
/// cost column is normal); a cell with garbage in it gets a warning so a
/// typo'd quantity is not mistaken for a genuine zero
fn parse_numeric_field(record: &csv::StringRecord, column: usize, field: &str, row: usize) -> f64 {
    match record.get(column) {
        None => 0.0,
        Some(raw) if raw.is_empty() => 0.0,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(row, field, value = raw, "Unparseable number in holdings row, using 0");
                0.0
            }
        },
    }
}
