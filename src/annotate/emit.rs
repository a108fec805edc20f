// src/annotate/emit.rs

use ahash::AHashSet;
use rand::Rng;

use super::labels::LabelTagger;
use super::significance::{marker_for, Marker};
use crate::diffexp::PValueColumn;
use crate::palette::ColourMap;
use crate::taxtree::CladeMap;
use crate::types::{AnnotationRow, DiffRecord};

pub const CLADE_MARKER_COLOR: &str = "clade_marker_color";
pub const CLADE_MARKER_SIZE: &str = "clade_marker_size";
pub const CLADE_MARKER_SHAPE: &str = "clade_marker_shape";
pub const BACKGROUND_COLOR: &str = "annotation_background_color";
pub const ANNOTATION: &str = "annotation";
pub const FONT_SIZE: &str = "annotation_font_size";
pub const RING_COLOR: &str = "ring_color";
pub const RING_HEIGHT: &str = "ring_height";

#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub pvalue: PValueColumn,
    /// Taxa that always get a text label.
    pub label_whitelist: Vec<String>,
    /// Also label every significant taxon.
    pub label_significant: bool,
    pub font_size: u32,
    /// Ring level used for the fold-change encoding.
    pub ring: u32,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            pvalue: PValueColumn::Pval,
            label_whitelist: Vec::new(),
            label_significant: true,
            font_size: 7,
            ring: 1,
        }
    }
}

/// Annotation rows plus a few counts for the log.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub rows: Vec<AnnotationRow>,
    pub retained: usize,
    pub significant: usize,
    pub labelled: usize,
}

fn float(v: f64) -> String {
    format!("{:.6}", v)
}

/// Turns differential records into GraPhlAn annotation rows.
///
/// Records whose taxon is outside the clade map are skipped. Rows come out
/// in blocks: marker size/colour per record, marker shape per record, clade
/// colours, clade backgrounds, then labels. Taxa that are not significant
/// take the colour of the clade they fall under.
pub fn annotate<R: Rng>(
    records: &[DiffRecord],
    clades: &CladeMap,
    colours: &ColourMap,
    options: &AnnotateOptions,
    rng: &mut R,
) -> Annotations {
    let keep = clades.keep_set();
    let whitelist: AHashSet<&str> = options.label_whitelist.iter().map(String::as_str).collect();

    let retained: Vec<(&DiffRecord, Marker)> = records
        .iter()
        .filter(|r| keep.contains(&r.taxon))
        .map(|r| (r, marker_for(r, options.pvalue)))
        .collect();

    let skipped = records.len() - retained.len();
    if skipped > 0 {
        log::debug!("{} record(s) outside the selected clades", skipped);
    }
    for (rec, _) in &retained {
        if keep.is_ambiguous(&rec.taxon) {
            log::warn!(
                "{:?} names taxa in more than one {} clade; coloured as {}",
                rec.taxon,
                clades.rank(),
                keep.clade_of(&rec.taxon).unwrap_or("?")
            );
        }
    }

    let mut out = Annotations {
        retained: retained.len(),
        ..Default::default()
    };
    let rows = &mut out.rows;

    for (rec, marker) in &retained {
        match marker.direction {
            Some(direction) => {
                out.significant += 1;
                if rec.fold_change == 0.0 {
                    log::debug!(
                        "{} (line {}) is significant with no fold change; marked as depleted",
                        rec.taxon,
                        rec.line
                    );
                }
                let colour = direction.colour();
                rows.push(AnnotationRow::new(&rec.taxon, CLADE_MARKER_COLOR, colour));
                rows.push(AnnotationRow::new(&rec.taxon, CLADE_MARKER_SIZE, float(marker.size)));
                rows.push(AnnotationRow::new(&rec.taxon, BACKGROUND_COLOR, colour));
                rows.push(AnnotationRow::ring(&rec.taxon, RING_COLOR, options.ring, colour));
                rows.push(AnnotationRow::ring(
                    &rec.taxon,
                    RING_HEIGHT,
                    options.ring,
                    float(rec.fold_change.abs()),
                ));
            }
            None => {
                if let Some(hex) = keep.clade_of(&rec.taxon).and_then(|key| colours.get(key)) {
                    rows.push(AnnotationRow::new(&rec.taxon, CLADE_MARKER_COLOR, *hex));
                }
                rows.push(AnnotationRow::new(&rec.taxon, CLADE_MARKER_SIZE, float(marker.size)));
            }
        }
    }

    for (rec, marker) in &retained {
        rows.push(AnnotationRow::new(&rec.taxon, CLADE_MARKER_SHAPE, marker.shape));
    }
    for (clade, hex) in colours {
        rows.push(AnnotationRow::new(clade, CLADE_MARKER_COLOR, *hex));
    }
    for (clade, hex) in colours {
        rows.push(AnnotationRow::new(clade, BACKGROUND_COLOR, *hex));
    }

    let mut tagger = LabelTagger::new(rng);
    for (rec, marker) in &retained {
        let labelled = clades.is_clade(&rec.taxon)
            || whitelist.contains(rec.taxon.as_str())
            || (options.label_significant && marker.significant);
        if labelled {
            rows.push(AnnotationRow::new(&rec.taxon, ANNOTATION, tagger.tag(&rec.taxon)));
            rows.push(AnnotationRow::new(&rec.taxon, FONT_SIZE, options.font_size.to_string()));
            out.labelled += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::assign_colours;
    use crate::taxtree::{build_clade_map, parse_lineage_line, Rank};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn clades() -> CladeMap {
        let lineages: Vec<_> = [
            "Bacteria.Firmicutes.Bacilli",
            "Bacteria.Firmicutes.Clostridia",
            "Bacteria.Bacteroidetes.Bacteroidia",
        ]
        .iter()
        .filter_map(|l| parse_lineage_line(l))
        .collect();
        build_clade_map(&lineages, Rank::Phylum)
    }

    fn record(taxon: &str, fc: f64, p: f64) -> DiffRecord {
        DiffRecord {
            taxon: taxon.to_string(),
            fold_change: fc,
            pvalue: p,
            padj: 1.0,
            line: 1,
        }
    }

    fn lines(a: &Annotations) -> Vec<String> {
        a.rows.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_annotation_blocks() {
        let clades = clades();
        let colours = assign_colours(&clades).unwrap();
        let records = vec![
            record("Bacilli", 1.5, 0.01),
            record("Clostridia", 0.4, 0.5),
            record("Proteobacteria", 3.0, 0.0001),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = annotate(&records, &clades, &colours, &AnnotateOptions::default(), &mut rng);

        assert_eq!(out.retained, 2);
        assert_eq!(out.significant, 1);

        let p_size = 100.0 * -(0.5f64.log10());
        let expected = vec![
            "Bacilli\tclade_marker_color\tr".to_string(),
            "Bacilli\tclade_marker_size\t200.000000".to_string(),
            "Bacilli\tannotation_background_color\tr".to_string(),
            "Bacilli\tring_color\t1\tr".to_string(),
            "Bacilli\tring_height\t1\t1.500000".to_string(),
            "Clostridia\tclade_marker_color\t#FAEBD7".to_string(),
            format!("Clostridia\tclade_marker_size\t{:.6}", p_size),
            "Bacilli\tclade_marker_shape\t*".to_string(),
            "Clostridia\tclade_marker_shape\to".to_string(),
            "Bacteria.Bacteroidetes\tclade_marker_color\t#F0F8FF".to_string(),
            "Bacteria.Firmicutes\tclade_marker_color\t#FAEBD7".to_string(),
            "Bacteria.Bacteroidetes\tannotation_background_color\t#F0F8FF".to_string(),
            "Bacteria.Firmicutes\tannotation_background_color\t#FAEBD7".to_string(),
            "Bacilli\tannotation\tBacilli".to_string(),
            "Bacilli\tannotation_font_size\t7".to_string(),
        ];
        assert_eq!(lines(&out), expected);
    }

    #[test]
    fn test_depleted_taxa_are_blue() {
        let clades = clades();
        let colours = assign_colours(&clades).unwrap();
        let records = vec![record("Bacteroidia", -2.25, 0.001)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = annotate(&records, &clades, &colours, &AnnotateOptions::default(), &mut rng);

        let text = lines(&out);
        assert!(text.contains(&"Bacteroidia\tclade_marker_color\tb".to_string()));
        assert!(text.contains(&"Bacteroidia\tring_height\t1\t2.250000".to_string()));
    }

    #[test]
    fn test_labels_for_clades_and_whitelist_only() {
        let clades = clades();
        let colours = assign_colours(&clades).unwrap();
        let records = vec![
            record("Firmicutes", 0.1, 0.9),
            record("Bacilli", 0.1, 0.9),
            record("Clostridia", 0.1, 0.9),
            record("Bacteroidia", 2.0, 0.001),
        ];
        let options = AnnotateOptions {
            label_whitelist: vec!["Clostridia".to_string()],
            label_significant: false,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = annotate(&records, &clades, &colours, &options, &mut rng);

        let labelled: Vec<_> = out
            .rows
            .iter()
            .filter(|r| r.attribute == ANNOTATION)
            .map(|r| r.taxon.as_str())
            .collect();
        assert_eq!(labelled, vec!["Firmicutes", "Clostridia"]);
        assert_eq!(out.labelled, 2);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let lineages: Vec<_> = ["Bacteria.Firmicutes.Ruminococcaceae_UCG"]
            .iter()
            .filter_map(|l| parse_lineage_line(l))
            .collect();
        let clades = build_clade_map(&lineages, Rank::Phylum);
        let colours = assign_colours(&clades).unwrap();
        let records = vec![record("Ruminococcaceae_UCG", 1.0, 0.0001)];

        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            lines(&annotate(&records, &clades, &colours, &AnnotateOptions::default(), &mut rng))
        };
        let first = run(7);
        assert_eq!(first, run(7));

        let label = first
            .iter()
            .find(|l| l.contains("\tannotation\t"))
            .unwrap();
        assert!(label.ends_with(":Ruminococcaceae_UCG"));
    }

    #[test]
    fn test_descendants_take_their_clade_colour() {
        let clades = clades();
        let colours = assign_colours(&clades).unwrap();
        let records = vec![
            record("Bacilli", 0.2, 0.5),
            record("Bacteroidia", -0.2, 0.5),
            record("Bacteria.Firmicutes", 0.1, 0.9),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = annotate(&records, &clades, &colours, &AnnotateOptions::default(), &mut rng);

        let text = lines(&out);
        assert_eq!(text[0], "Bacilli\tclade_marker_color\t#FAEBD7");
        assert_eq!(text[1], format!("Bacilli\tclade_marker_size\t{:.6}", 100.0 * -(0.5f64.log10())));
        assert_eq!(text[2], "Bacteroidia\tclade_marker_color\t#F0F8FF");
        // a full lineage resolves the same way as a bare name
        assert_eq!(text[4], "Bacteria.Firmicutes\tclade_marker_color\t#FAEBD7");
    }

    #[test]
    fn test_tab_lineage_names_keep_their_dots() {
        let lineages: Vec<_> = ["Bacteria\tFirmicutes\tLactobacillus sp."]
            .iter()
            .filter_map(|l| parse_lineage_line(l))
            .collect();
        let clades = build_clade_map(&lineages, Rank::Phylum);
        let colours = assign_colours(&clades).unwrap();
        let records = vec![record("Lactobacillus sp.", 1.2, 0.001)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = annotate(&records, &clades, &colours, &AnnotateOptions::default(), &mut rng);

        assert_eq!(out.retained, 1);
        assert_eq!(out.significant, 1);
        assert!(lines(&out).contains(&"Lactobacillus sp.\tclade_marker_color\tr".to_string()));
    }
}
