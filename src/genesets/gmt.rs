// src/genesets/gmt.rs

use std::io::BufRead;

use ahash::AHashSet;

use crate::error::AnnotError;
use crate::types::GeneSetRow;

/// Result of converting a GMT stream.
#[derive(Debug, Clone, Default)]
pub struct GmtConversion {
    pub rows: Vec<GeneSetRow>,
    pub sets_read: usize,
    pub sets_written: usize,
}

/// Converts GMT lines (`name  description  gene...`) into one row per gene:
/// `ontology  gene  name  name  description`.
///
/// With a `filter`, only sets named in it are converted.
pub fn gmt_to_rows<R: BufRead>(
    reader: R,
    ontology: &str,
    filter: Option<&AHashSet<String>>,
) -> Result<GmtConversion, AnnotError> {
    let mut out = GmtConversion::default();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < 2 {
            return Err(AnnotError::malformed(
                idx + 1,
                "GMT lines need at least a set name and a description",
            ));
        }
        let (name, evidence) = (fields[0], fields[1]);
        out.sets_read += 1;

        if let Some(keep) = filter {
            if !keep.contains(name) {
                continue;
            }
        }
        out.sets_written += 1;

        for gene in fields[2..].iter().filter(|g| !g.is_empty()) {
            out.rows.push(GeneSetRow {
                ontology: ontology.to_string(),
                gene: gene.to_string(),
                set_name: name.to_string(),
                description: name.to_string(),
                evidence: evidence.to_string(),
            });
        }
    }

    log::info!(
        "read {} gene sets, wrote {} ({} gene rows)",
        out.sets_read,
        out.sets_written,
        out.rows.len()
    );
    Ok(out)
}
