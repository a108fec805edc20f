// src/genesets/motifs.rs

use std::collections::BTreeSet;
use std::io::BufRead;

use ahash::{AHashMap, AHashSet};

use crate::error::AnnotError;
use crate::types::GeneSetRow;

/// Set names containing this are dropped.
pub const UNKNOWN_MARKER: &str = "UNKNOWN";
/// Set names containing this are microRNA motifs and dropped.
pub const MIRNA_MARKER: &str = "MIR";

/// Extracts the transcription factor from a motif set name,
/// e.g. `V$TF1_01` -> `TF1`.
pub fn transcription_factor(name: &str) -> Option<&str> {
    let after = name.split('$').nth(1)?;
    after.split('_').next().filter(|tf| !tf.is_empty())
}

/// One motif gene set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifSet {
    pub name: String,
    pub tf: String,
    /// Ontology label of the first row seen for this set.
    pub ontology: String,
    pub genes: BTreeSet<String>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotifSummary {
    pub input_sets: usize,
    pub unknown: usize,
    pub mirna: usize,
    pub redundant: usize,
    pub retained: usize,
}

impl MotifSummary {
    pub fn log(&self) {
        log::info!("started with {} genesets", self.input_sets);
        log::info!("removed {} UNKNOWN", self.unknown);
        log::info!("removed {} miRNA", self.mirna);
        log::info!("removed {} completely redundant", self.redundant);
        log::info!("wrote {} motif genesets", self.retained);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SanitisedMotifs {
    /// Retained sets in first-seen order.
    pub sets: Vec<MotifSet>,
    /// `(kept, dropped)` name pairs with identical membership.
    pub redundant_pairs: Vec<(String, String)>,
    pub summary: MotifSummary,
}

impl SanitisedMotifs {
    /// One row per retained (set, gene): `ontology gene name name ontology`.
    pub fn rows(&self) -> Vec<GeneSetRow> {
        self.sets
            .iter()
            .flat_map(|set| {
                set.genes.iter().map(move |gene| GeneSetRow {
                    ontology: set.ontology.clone(),
                    gene: gene.clone(),
                    set_name: set.name.clone(),
                    description: set.name.clone(),
                    evidence: set.ontology.clone(),
                })
            })
            .collect()
    }
}

/// Reads `(ontology, gene, set name)` triples and groups them into sets,
/// dropping UNKNOWN and miRNA sets. Returns the surviving sets in
/// first-seen order plus the input/unknown/miRNA counts.
pub fn read_motif_sets<R: BufRead>(reader: R) -> Result<(Vec<MotifSet>, MotifSummary), AnnotError> {
    let mut all_names: AHashSet<String> = AHashSet::new();
    let mut unknown: AHashSet<String> = AHashSet::new();
    let mut mirna: AHashSet<String> = AHashSet::new();

    let mut sets: Vec<MotifSet> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < 3 {
            return Err(AnnotError::malformed(
                idx + 1,
                format!("expected ontology, gene and set name, found {} column(s)", fields.len()),
            ));
        }
        let (ontology, gene, name) = (fields[0], fields[1], fields[2]);

        all_names.insert(name.to_string());

        if name.contains(UNKNOWN_MARKER) {
            unknown.insert(name.to_string());
            continue;
        }
        if name.contains(MIRNA_MARKER) {
            mirna.insert(name.to_string());
            continue;
        }

        match index.get(name) {
            Some(&i) => {
                sets[i].genes.insert(gene.to_string());
            }
            None => {
                let tf = transcription_factor(name).ok_or_else(|| {
                    AnnotError::malformed(idx + 1, format!("gene set {:?} has no `$TF_` motif name", name))
                })?;
                index.insert(name.to_string(), sets.len());
                sets.push(MotifSet {
                    name: name.to_string(),
                    tf: tf.to_string(),
                    ontology: ontology.to_string(),
                    genes: BTreeSet::from([gene.to_string()]),
                });
            }
        }
    }

    let summary = MotifSummary {
        input_sets: all_names.len(),
        unknown: unknown.len(),
        mirna: mirna.len(),
        ..Default::default()
    };
    Ok((sets, summary))
}

/// Removes sets whose gene membership duplicates another set of the same
/// transcription factor. The first-seen set of each identical group is
/// kept; a transcription factor with a single set is always kept.
pub fn deduplicate(sets: Vec<MotifSet>, mut summary: MotifSummary) -> SanitisedMotifs {
    // tf -> indices into `sets`, tfs in first-seen order
    let mut tf_order: Vec<&str> = Vec::new();
    let mut by_tf: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (i, set) in sets.iter().enumerate() {
        let members = by_tf.entry(set.tf.as_str()).or_insert_with(|| {
            tf_order.push(set.tf.as_str());
            Vec::new()
        });
        members.push(i);
    }

    let mut keep = vec![false; sets.len()];
    let mut redundant_pairs = Vec::new();

    for tf in &tf_order {
        let Some(members) = by_tf.get(tf) else {
            continue;
        };
        if members.len() == 1 {
            keep[members[0]] = true;
            continue;
        }

        let mut kept: Vec<usize> = Vec::with_capacity(members.len());
        for &i in members {
            match kept.iter().find(|&&k| sets[k].genes == sets[i].genes) {
                Some(&k) => redundant_pairs.push((sets[k].name.clone(), sets[i].name.clone())),
                None => {
                    kept.push(i);
                    keep[i] = true;
                }
            }
        }
    }

    let retained: Vec<MotifSet> = sets
        .into_iter()
        .zip(keep)
        .filter_map(|(set, k)| k.then_some(set))
        .collect();

    summary.redundant = redundant_pairs.len();
    summary.retained = retained.len();

    SanitisedMotifs {
        sets: retained,
        redundant_pairs,
        summary,
    }
}

/// Full motif clean-up over a triple stream.
pub fn sanitise_motifs<R: BufRead>(reader: R) -> Result<SanitisedMotifs, AnnotError> {
    let (sets, summary) = read_motif_sets(reader)?;
    Ok(deduplicate(sets, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> SanitisedMotifs {
        sanitise_motifs(Cursor::new(input)).unwrap()
    }

    fn names(out: &SanitisedMotifs) -> Vec<&str> {
        out.sets.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_transcription_factor() {
        assert_eq!(transcription_factor("V$TF1_01"), Some("TF1"));
        assert_eq!(transcription_factor("V$AP1_Q2_01"), Some("AP1"));
        assert_eq!(transcription_factor("V$NFKB"), Some("NFKB"));
        assert_eq!(transcription_factor("TF1_01"), None);
        assert_eq!(transcription_factor("V$_01"), None);
    }

    #[test]
    fn test_distinct_memberships_are_both_kept() {
        let out = run("GO\tGENE1\tV$TF1_01\nGO\tGENE1\tV$TF1_02\nGO\tGENE2\tV$TF1_02\n");

        assert_eq!(names(&out), vec!["V$TF1_01", "V$TF1_02"]);
        assert_eq!(out.summary.redundant, 0);

        let rows: Vec<String> = out.rows().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rows,
            vec![
                "GO\tGENE1\tV$TF1_01\tV$TF1_01\tGO",
                "GO\tGENE1\tV$TF1_02\tV$TF1_02\tGO",
                "GO\tGENE2\tV$TF1_02\tV$TF1_02\tGO",
            ]
        );
    }

    #[test]
    fn test_identical_sets_collapse_to_first_seen() {
        let out = run("\
GO\tA\tV$TF1_02
GO\tB\tV$TF1_02
GO\tB\tV$TF1_01
GO\tA\tV$TF1_01
GO\tA\tV$TF1_03
GO\tB\tV$TF1_03
GO\tC\tV$TF2_01
");
        assert_eq!(names(&out), vec!["V$TF1_02", "V$TF2_01"]);
        assert_eq!(out.summary.redundant, 2);
        assert_eq!(
            out.redundant_pairs,
            vec![
                ("V$TF1_02".to_string(), "V$TF1_01".to_string()),
                ("V$TF1_02".to_string(), "V$TF1_03".to_string()),
            ]
        );
    }

    #[test]
    fn test_same_genes_different_tf_are_not_redundant() {
        let out = run("GO\tA\tV$TF1_01\nGO\tA\tV$TF2_01\n");
        assert_eq!(out.summary.retained, 2);
        assert_eq!(out.summary.redundant, 0);
    }

    #[test]
    fn test_single_set_is_always_retained() {
        let out = run("GO\tA\tV$LONE_01\n");
        assert_eq!(names(&out), vec!["V$LONE_01"]);
        assert_eq!(out.summary.retained, 1);
    }

    #[test]
    fn test_unknown_and_mirna_are_discarded() {
        let out = run("\
GO\tA\tV$UNKNOWN_01
GO\tB\tV$UNKNOWN_01
GO\tA\tGGCAGCT,MIR-22
GO\tA\tV$TF1_01
");
        assert_eq!(out.summary.input_sets, 3);
        assert_eq!(out.summary.unknown, 1);
        assert_eq!(out.summary.mirna, 1);
        assert_eq!(out.summary.retained, 1);
        assert_eq!(names(&out), vec!["V$TF1_01"]);
    }

    #[test]
    fn test_output_genes_belong_to_their_input_set() {
        let input = "\
GO\tA\tV$TF1_01
GO\tB\tV$TF1_01
GO\tA\tV$TF1_02
GO\tC\tV$TF2_01
GO\tD\tV$TF2_01
GO\tC\tV$TF2_02
GO\tD\tV$TF2_02
";
        let (groups, _) = read_motif_sets(Cursor::new(input)).unwrap();
        let out = run(input);

        for row in out.rows() {
            let group = groups.iter().find(|g| g.name == row.set_name).unwrap();
            assert!(group.genes.contains(&row.gene));
        }
        assert_eq!(out.summary.retained, 3);
    }

    #[test]
    fn test_ontology_follows_each_set() {
        let out = run("GO\tA\tV$TF1_01\nTRANSFAC\tB\tV$TF2_01\n");
        let rows = out.rows();
        assert_eq!(rows[0].ontology, "GO");
        assert_eq!(rows[1].ontology, "TRANSFAC");
        assert_eq!(rows[1].evidence, "TRANSFAC");
    }

    #[test]
    fn test_malformed_rows() {
        let short = sanitise_motifs(Cursor::new("GO\tA\n")).unwrap_err();
        assert!(matches!(short, AnnotError::MalformedRow { line: 1, .. }));

        let no_tf = sanitise_motifs(Cursor::new("GO\tA\tV$TF1_01\nGO\tA\tPLAIN_SET\n")).unwrap_err();
        assert!(matches!(no_tf, AnnotError::MalformedRow { line: 2, .. }));
    }
}
