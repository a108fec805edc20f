//src/diffexp.rs

use std::io::BufRead;

use clap::ValueEnum;

use crate::error::AnnotError;
use crate::types::DiffRecord;

/// Which p-value drives marker size and significance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PValueColumn {
    /// Raw p-value
    Pval,
    /// Multiple-testing adjusted p-value
    Padj,
}

/// Zero-based column positions in the differential table. The taxon is
/// always taken from the last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffColumns {
    pub fold_change: usize,
    pub pvalue: usize,
    pub padj: usize,
}

impl Default for DiffColumns {
    fn default() -> Self {
        Self {
            fold_change: 1,
            pvalue: 3,
            padj: 4,
        }
    }
}

impl DiffColumns {
    fn min_fields(&self) -> usize {
        // +1 for the trailing taxon column
        self.fold_change.max(self.pvalue).max(self.padj) + 2
    }
}

impl DiffRecord {
    pub fn p(&self, which: PValueColumn) -> f64 {
        match which {
            PValueColumn::Pval => self.pvalue,
            PValueColumn::Padj => self.padj,
        }
    }

    /// `-log10(p)` for the selected column.
    pub fn score(&self, which: PValueColumn) -> f64 {
        -self.p(which).log10()
    }
}

/// Header lines of limma/edgeR/DESeq2 style tables.
pub fn is_header(line: &str) -> bool {
    line.contains("logFC") || line.contains("log2FoldChange")
}

fn is_missing(field: &str) -> bool {
    matches!(field.trim().trim_matches('"'), "" | "NA" | "NaN" | "nan")
}

fn parse_field(field: &str, line: usize, missing: f64) -> Result<f64, AnnotError> {
    let field = field.trim().trim_matches('"');
    match field {
        _ if is_missing(field) => Ok(missing),
        _ => field.parse::<f64>().map_err(|_| AnnotError::InvalidNumber {
            line,
            value: field.to_string(),
        }),
    }
}

/// Parses one data line. `line` is the 1-based line number for errors.
pub fn parse_diff_line(text: &str, line: usize, columns: &DiffColumns) -> Result<DiffRecord, AnnotError> {
    let fields: Vec<&str> = text.split('\t').collect();
    if fields.len() < columns.min_fields() {
        return Err(AnnotError::malformed(
            line,
            format!(
                "expected at least {} tab-separated columns, found {}",
                columns.min_fields(),
                fields.len()
            ),
        ));
    }

    let taxon = fields[fields.len() - 1].replace('"', "");
    if is_missing(fields[columns.fold_change]) {
        log::debug!("line {}: no fold change for {}; taken as 0", line, taxon.trim());
    }
    Ok(DiffRecord {
        taxon: taxon.trim().to_string(),
        fold_change: parse_field(fields[columns.fold_change], line, 0.0)?,
        pvalue: parse_field(fields[columns.pvalue], line, 1.0)?,
        padj: parse_field(fields[columns.padj], line, 1.0)?,
        line,
    })
}

/// Reads a whole differential table, skipping header and blank lines.
pub fn read_diff_table<R: BufRead>(reader: R, columns: &DiffColumns) -> Result<Vec<DiffRecord>, AnnotError> {
    let mut records = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() || is_header(text) {
            continue;
        }
        records.push(parse_diff_line(text, idx + 1, columns)?);
    }
    log::info!("read {} differential abundance records", records.len());
    Ok(records)
}
