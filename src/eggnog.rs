//src/eggnog.rs

use std::io::BufRead;

use ahash::AHashMap;

use crate::error::AnnotError;
use crate::types::NogCategoryRow;

/// NOGs without a category are filed under "function unknown".
pub const UNKNOWN_FUNCTION: char = 'S';

/// Category letter -> description.
pub type CategoryMap = AHashMap<char, String>;

/// Parses an eggNOG functional categories file. Every line of the form
/// ` [J] Translation, ribosomal structure and biogenesis` contributes one
/// entry; section headings and blank lines are ignored.
pub fn read_categories<R: BufRead>(reader: R) -> Result<CategoryMap, AnnotError> {
    let mut categories = CategoryMap::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let Some((_, rest)) = line.split_once('[') else {
            continue;
        };
        let Some((id, description)) = rest.split_once(']') else {
            log::debug!("line {}: unterminated category bracket", idx + 1);
            continue;
        };

        let mut chars = id.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                categories.insert(c, description.trim().to_string());
            }
            _ => log::debug!("line {}: ignoring category id {:?}", idx + 1, id),
        }
    }

    log::info!("read {} functional categories", categories.len());
    Ok(categories)
}

/// Maps each `nog<TAB>categories` line to one row per category letter.
pub fn map_nogs<R: BufRead>(reader: R, categories: &CategoryMap) -> Result<Vec<NogCategoryRow>, AnnotError> {
    let mut rows = Vec::new();
    let mut nogs = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < 2 {
            return Err(AnnotError::malformed(idx + 1, "expected `nog<TAB>categories`"));
        }
        let nog = fields[0].trim();
        let letters = fields[1].trim();
        nogs += 1;

        let assigned: Vec<char> = if letters.is_empty() {
            vec![UNKNOWN_FUNCTION]
        } else {
            letters.chars().collect()
        };

        for category in assigned {
            let description = categories
                .get(&category)
                .ok_or_else(|| AnnotError::UnknownCategory {
                    nog: nog.to_string(),
                    category,
                })?;
            rows.push(NogCategoryRow {
                nog: nog.to_string(),
                category,
                description: description.clone(),
            });
        }
    }

    log::info!("assigned {} NOGs to {} category rows", nogs, rows.len());
    Ok(rows)
}
