//src/types.rs

use std::fmt;

/// One row of a differential-abundance table.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRecord {
    pub taxon: String,
    pub fold_change: f64,
    pub pvalue: f64,       // "NA" is read as 1.0
    pub padj: f64,         // "NA" is read as 1.0
    pub line: usize,
}

/// One line of a GraPhlAn annotation file:
///  taxon  attribute  [ring]  value
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    pub taxon: String,
    pub attribute: &'static str,
    pub ring: Option<u32>,
    pub value: String,
}

impl AnnotationRow {
    pub fn new(taxon: &str, attribute: &'static str, value: impl Into<String>) -> Self {
        Self {
            taxon: taxon.to_string(),
            attribute,
            ring: None,
            value: value.into(),
        }
    }

    pub fn ring(taxon: &str, attribute: &'static str, ring: u32, value: impl Into<String>) -> Self {
        Self {
            taxon: taxon.to_string(),
            attribute,
            ring: Some(ring),
            value: value.into(),
        }
    }
}

impl fmt::Display for AnnotationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ring {
            Some(ring) => write!(f, "{}\t{}\t{}\t{}", self.taxon, self.attribute, ring, self.value),
            None => write!(f, "{}\t{}\t{}", self.taxon, self.attribute, self.value),
        }
    }
}

/// A gene/gene-set association in the long format consumed by the
/// enrichment tooling:
///  ontology  gene  set  description  evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSetRow {
    pub ontology: String,
    pub gene: String,
    pub set_name: String,
    pub description: String,
    pub evidence: String,
}

impl fmt::Display for GeneSetRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.ontology, self.gene, self.set_name, self.description, self.evidence
        )
    }
}

/// A NOG assigned to one eggNOG functional category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NogCategoryRow {
    pub nog: String,
    pub category: char,
    pub description: String,
}

impl fmt::Display for NogCategoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NOG\t{}\t{}\t{}\tNA", self.nog, self.category, self.description)
    }
}
