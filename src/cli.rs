//src/cli.rs

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::annotate::AnnotateOptions;
use crate::diffexp::{DiffColumns, PValueColumn};
use crate::error::AnnotError;
use crate::taxtree::Rank;
use crate::GraphlanConfig;

/// Option checks that clap cannot express on its own.
pub trait ArgCheck {
    fn check(&self) -> Result<(), AnnotError>;
}

/// Fails unless `path` is an existing regular file.
pub fn validate(path: &Path) -> Result<(), AnnotError> {
    if !path.exists() {
        return Err(AnnotError::InvalidArgs(format!(
            "file {} does not exist",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(AnnotError::InvalidArgs(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(())
}

fn validate_opt(path: Option<&PathBuf>) -> Result<(), AnnotError> {
    match path {
        Some(p) => validate(p),
        None => Ok(()),
    }
}

/// Create graphical parameters for GraPhlAn from a differential abundance
/// table read on stdin.
#[derive(Debug, Parser)]
#[command(name = "diff2graphlan", version)]
pub struct Diff2GraphlanArgs {
    /// Taxa mapping file - one lineage per line (dot or tab separated)
    #[arg(short = 'm', long = "taxa-map", value_name = "PATH")]
    pub taxa_map: PathBuf,

    /// Highest taxonomic level to visualise
    #[arg(short = 'l', long = "highest-level", value_name = "RANK", default_value = "family")]
    pub highest_level: Rank,

    /// Type of p-value to use for clade size
    #[arg(short = 'u', long = "use", value_enum, value_name = "PVALUE")]
    pub pvalue: PValueColumn,

    /// Filter clades; keeps only those named with --keep
    #[arg(short = 'f', long = "filter")]
    pub filter: bool,

    /// Keep all clades below these (comma separated)
    #[arg(short = 'k', long = "keep", value_delimiter = ',', value_name = "CLADES")]
    pub keep: Vec<String>,

    /// Extra taxa to label (comma separated)
    #[arg(long = "label", value_delimiter = ',', value_name = "TAXA")]
    pub label: Vec<String>,

    /// Do not label significant taxa unless they are clades or listed in --label
    #[arg(long = "no-label-significant")]
    pub no_label_significant: bool,

    #[arg(long = "font-size", default_value_t = 7)]
    pub font_size: u32,

    /// The taxa mapping file has no header line
    #[arg(long = "no-header")]
    pub no_header: bool,

    #[arg(long = "fc-column", default_value_t = 1, value_name = "INDEX")]
    pub fc_column: usize,

    #[arg(long = "pval-column", default_value_t = 3, value_name = "INDEX")]
    pub pval_column: usize,

    #[arg(long = "padj-column", default_value_t = 4, value_name = "INDEX")]
    pub padj_column: usize,

    /// Where to write the retained lineages
    #[arg(long = "tree-out", default_value = "input.txt", value_name = "PATH")]
    pub tree_out: PathBuf,

    /// Differential table (defaults to stdin)
    #[arg(short = 'I', long = "stdin", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Annotation output (defaults to stdout)
    #[arg(short = 'S', long = "stdout", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Seed for the label prefixes
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ArgCheck for Diff2GraphlanArgs {
    fn check(&self) -> Result<(), AnnotError> {
        if self.filter && self.keep.is_empty() {
            return Err(AnnotError::InvalidArgs(
                "must specify which clades to keep (--keep) when filtering".to_string(),
            ));
        }
        if !self.filter && !self.keep.is_empty() {
            log::warn!("--keep given without --filter; ignoring it");
        }
        validate(&self.taxa_map)?;
        validate_opt(self.input.as_ref())
    }
}

impl Diff2GraphlanArgs {
    pub fn to_config(&self) -> GraphlanConfig {
        GraphlanConfig {
            rank: self.highest_level,
            has_header: !self.no_header,
            keep: if self.filter {
                Some(self.keep.clone())
            } else {
                None
            },
            columns: DiffColumns {
                fold_change: self.fc_column,
                pvalue: self.pval_column,
                padj: self.padj_column,
            },
            options: AnnotateOptions {
                pvalue: self.pvalue,
                label_whitelist: self.label.clone(),
                label_significant: !self.no_label_significant,
                font_size: self.font_size,
                ..Default::default()
            },
        }
    }
}

/// Remove UNKNOWN, miRNA and redundant motif gene sets from
/// ontology/gene/set triples.
#[derive(Debug, Parser)]
#[command(name = "sanitise-motifs", version)]
pub struct SanitiseMotifsArgs {
    #[arg(short = 'I', long = "stdin", value_name = "PATH")]
    pub input: Option<PathBuf>,

    #[arg(short = 'S', long = "stdout", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl ArgCheck for SanitiseMotifsArgs {
    fn check(&self) -> Result<(), AnnotError> {
        validate_opt(self.input.as_ref())
    }
}

/// Output a file that maps eggNOG identifiers to functional categories.
#[derive(Debug, Parser)]
#[command(name = "eggnog2categories", version)]
pub struct EggnogArgs {
    /// eggNOG functional categories, i.e. the [ID] description file
    #[arg(short = 'f', long = "functions", value_name = "PATH")]
    pub functions: PathBuf,

    /// NOG to category mapping file
    #[arg(short = 'n', long = "nogs", value_name = "PATH")]
    pub nogs: PathBuf,

    #[arg(short = 'S', long = "stdout", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl ArgCheck for EggnogArgs {
    fn check(&self) -> Result<(), AnnotError> {
        validate(&self.functions)?;
        validate(&self.nogs)
    }
}

/// Convert a .gmt file into a .tsv file of ontology/gene/set rows.
#[derive(Debug, Parser)]
#[command(name = "gmt2tsv", version)]
pub struct GmtArgs {
    /// Ontology label
    #[arg(short = 'o', long = "ontology", value_name = "LABEL")]
    pub ontology: String,

    /// Filter gene sets using --filter-list
    #[arg(short = 'f', long = "filter")]
    pub filter: bool,

    /// List of pathways to keep, one per line
    #[arg(short = 'l', long = "filter-list", value_name = "PATH")]
    pub filter_list: Option<PathBuf>,

    #[arg(short = 'I', long = "stdin", value_name = "PATH")]
    pub input: Option<PathBuf>,

    #[arg(short = 'S', long = "stdout", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl ArgCheck for GmtArgs {
    fn check(&self) -> Result<(), AnnotError> {
        if self.filter && self.filter_list.is_none() {
            return Err(AnnotError::InvalidArgs(
                "must specify a list of pathways to keep (--filter-list)".to_string(),
            ));
        }
        if self.filter {
            validate_opt(self.filter_list.as_ref())?;
        }
        validate_opt(self.input.as_ref())
    }
}

impl GmtArgs {
    /// The filter list, only when filtering is switched on.
    pub fn active_filter(&self) -> Option<&Path> {
        if self.filter {
            self.filter_list.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff2graphlan_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree.txt");
        std::fs::write(&tree, "header\n").unwrap();
        let tree_arg = tree.to_string_lossy().to_string();

        let args = Diff2GraphlanArgs::parse_from(["diff2graphlan", "-m", tree_arg.as_str(), "-u", "padj"]);
        assert!(args.check().is_ok());

        let config = args.to_config();
        assert_eq!(config.rank, Rank::Family);
        assert!(config.has_header);
        assert!(config.keep.is_none());
        assert_eq!(config.columns, DiffColumns::default());
        assert_eq!(config.options.pvalue, PValueColumn::Padj);
        assert_eq!(args.tree_out, PathBuf::from("input.txt"));
    }

    #[test]
    fn test_diff2graphlan_filter_needs_keep() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree.txt");
        std::fs::write(&tree, "header\n").unwrap();
        let tree_arg = tree.to_string_lossy().to_string();

        let args = Diff2GraphlanArgs::parse_from(["diff2graphlan", "-m", tree_arg.as_str(), "-u", "pval", "-f"]);
        assert!(matches!(args.check(), Err(AnnotError::InvalidArgs(_))));

        let args = Diff2GraphlanArgs::parse_from([
            "diff2graphlan", "-m", tree_arg.as_str(), "-u", "pval", "-f", "-k", "Firmicutes,Bacteroidetes", "-l", "phylum",
        ]);
        assert!(args.check().is_ok());
        let config = args.to_config();
        assert_eq!(config.rank, Rank::Phylum);
        assert_eq!(
            config.keep,
            Some(vec!["Firmicutes".to_string(), "Bacteroidetes".to_string()])
        );
    }

    #[test]
    fn test_diff2graphlan_rejects_bad_values() {
        assert!(Diff2GraphlanArgs::try_parse_from(["diff2graphlan", "-m", "t", "-u", "qval"]).is_err());
        assert!(Diff2GraphlanArgs::try_parse_from(["diff2graphlan", "-m", "t", "-u", "pval", "-l", "strain"]).is_err());
        assert!(Diff2GraphlanArgs::try_parse_from(["diff2graphlan", "-u", "pval"]).is_err());
    }

    #[test]
    fn test_missing_taxa_map_fails_check() {
        let args = Diff2GraphlanArgs::parse_from(["diff2graphlan", "-m", "/no/such/tree.txt", "-u", "pval"]);
        assert!(matches!(args.check(), Err(AnnotError::InvalidArgs(_))));
    }

    #[test]
    fn test_gmt_filter_needs_list() {
        let args = GmtArgs::parse_from(["gmt2tsv", "-o", "kegg", "-f"]);
        assert!(matches!(args.check(), Err(AnnotError::InvalidArgs(_))));

        let args = GmtArgs::parse_from(["gmt2tsv", "-o", "kegg", "-l", "/no/such/list"]);
        // the list is ignored unless --filter is on
        assert!(args.check().is_ok());
        assert!(args.active_filter().is_none());
    }

    #[test]
    fn test_gmt_requires_ontology() {
        assert!(GmtArgs::try_parse_from(["gmt2tsv"]).is_err());
    }

    #[test]
    fn test_eggnog_requires_both_files() {
        assert!(EggnogArgs::try_parse_from(["eggnog2categories", "-f", "functions.txt"]).is_err());
        let args = EggnogArgs::parse_from(["eggnog2categories", "-f", "/no/functions", "-n", "/no/nogs"]);
        assert!(args.check().is_err());
    }
}
