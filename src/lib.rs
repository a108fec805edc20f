// src/lib.rs
pub mod annotate;
pub mod cli;
pub mod diffexp;
pub mod eggnog;
pub mod error;
pub mod files;
pub mod genesets;
pub mod logging;
pub mod palette;
pub mod progress;
pub mod taxtree;
pub mod types;

use std::fmt::{Display, Write as FmtWrite};
use std::io::BufRead;
use std::path::Path;

use ahash::AHashSet;
use rand::Rng;

use crate::annotate::{annotate, AnnotateOptions, Annotations};
use crate::diffexp::{read_diff_table, DiffColumns};
use crate::eggnog::{map_nogs, read_categories};
use crate::files::{open_reader, read_list};
use crate::genesets::GmtConversion;
use crate::palette::{assign_colours, ColourMap};
use crate::taxtree::{build_clade_map, input_tree_text, read_lineages, CladeMap, Rank};
use crate::types::NogCategoryRow;

pub use crate::error::AnnotError;
pub use crate::genesets::sanitise_motifs;

/// Renders rows one per line.
pub fn rows_to_text<T: Display>(rows: &[T]) -> String {
    let mut output = String::new();
    for row in rows {
        // writing into a String cannot fail
        let _ = writeln!(output, "{}", row);
    }
    output
}

/// Settings for one GraPhlAn annotation run.
#[derive(Debug, Clone)]
pub struct GraphlanConfig {
    /// Rank that defines the top-level clades.
    pub rank: Rank,
    /// Skip the first line of the lineage file.
    pub has_header: bool,
    /// Only these clades are kept when set.
    pub keep: Option<Vec<String>>,
    pub columns: DiffColumns,
    pub options: AnnotateOptions,
}

impl Default for GraphlanConfig {
    fn default() -> Self {
        Self {
            rank: Rank::Family,
            has_header: true,
            keep: None,
            columns: DiffColumns::default(),
            options: AnnotateOptions::default(),
        }
    }
}

/// Everything produced by a GraPhlAn annotation run. Text is generated on
/// demand from the structured rows.
pub struct GraphlanAnnotation {
    pub annotations: Annotations,
    /// Clades after optional filtering.
    pub clades: CladeMap,
    pub colours: ColourMap,
}

impl GraphlanAnnotation {
    /// The annotation file body.
    pub fn get_annotation_text(&self) -> String {
        rows_to_text(&self.annotations.rows)
    }

    /// The lineages to draw, one per line.
    pub fn get_input_tree_text(&self) -> String {
        input_tree_text(&self.clades)
    }
}

/// Builds GraPhlAn annotations from a lineage file and a differential
/// abundance table.
pub fn diff_to_graphlan<P, R, G>(
    taxa_map: P,
    diff_table: R,
    config: &GraphlanConfig,
    rng: &mut G,
) -> Result<GraphlanAnnotation, AnnotError>
where
    P: AsRef<Path>,
    R: BufRead,
    G: Rng,
{
    // 1. Read the tree and group it at the chosen rank
    let lineages = read_lineages(taxa_map, config.has_header)?;
    let tree = build_clade_map(&lineages, config.rank);

    // 2. Filter if requested
    let clades = match &config.keep {
        Some(names) => tree.select(names),
        None => tree,
    };

    // 3. One colour per clade
    let colours = assign_colours(&clades)?;

    // 4. Read the differential table and annotate
    let records = read_diff_table(diff_table, &config.columns)?;
    let annotations = annotate(&records, &clades, &colours, &config.options, rng);

    log::info!(
        "{} of {} taxa annotated ({} significant, {} labelled)",
        annotations.retained,
        records.len(),
        annotations.significant,
        annotations.labelled
    );

    Ok(GraphlanAnnotation {
        annotations,
        clades,
        colours,
    })
}

/// Maps NOGs to their eggNOG functional category descriptions.
pub fn eggnog_categories<P, Q>(functions: P, nogs: Q) -> Result<Vec<NogCategoryRow>, AnnotError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let categories = read_categories(open_reader(functions)?)?;
    map_nogs(open_reader(nogs)?, &categories)
}

/// Converts a GMT stream, optionally keeping only the sets listed in
/// `filter_list`.
pub fn gmt_to_tsv<R: BufRead>(
    gmt: R,
    ontology: &str,
    filter_list: Option<&Path>,
) -> Result<GmtConversion, AnnotError> {
    let filter: Option<AHashSet<String>> = match filter_list {
        Some(path) => Some(read_list(path)?.into_iter().collect()),
        None => None,
    };
    genesets::gmt_to_rows(gmt, ontology, filter.as_ref())
}
