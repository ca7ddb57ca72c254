pub mod types;

use crate::reference::types::StockRow;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 2] = ["symbol", "pe_ratio"];

/// Static per-ticker reference data, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<StockRow>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("reference table not found: {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("failed to load reference table: {}", path.display()))?;

        tracing::info!(path = %path.display(), rows = table.len(), "loaded reference table");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().context("failed to read CSV header")?.clone();
        for column in REQUIRED_COLUMNS {
            anyhow::ensure!(
                headers.iter().any(|h| h == column),
                "reference table is missing required column `{column}`"
            );
        }

        let mut rows = Vec::new();
        for (i, record) in reader.deserialize::<StockRow>().enumerate() {
            // Header is line 1.
            let line = i + 2;
            let mut row = record.with_context(|| format!("invalid reference row at line {line}"))?;
            row.symbol = row.symbol.trim().to_uppercase();
            anyhow::ensure!(!row.symbol.is_empty(), "empty symbol at line {line}");
            rows.push(row);
        }

        Self::from_rows(rows)
    }

    pub fn from_rows(rows: Vec<StockRow>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            anyhow::ensure!(
                index.insert(row.symbol.clone(), i).is_none(),
                "duplicate symbol in reference table: {}",
                row.symbol
            );
        }
        Ok(Self { rows, index })
    }

    pub fn get(&self, symbol: &str) -> Option<&StockRow> {
        self.index.get(symbol).map(|&i| &self.rows[i])
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
