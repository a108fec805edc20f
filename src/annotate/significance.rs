// src/annotate/significance.rs

use crate::diffexp::PValueColumn;
use crate::types::DiffRecord;

/// `-log10(p)` at or above this marks a taxon significant (p <= ~0.05).
pub const SIGNIFICANCE_THRESHOLD: f64 = 1.3;
/// Marker size for significant taxa.
pub const SIGNIFICANT_MARKER_SIZE: f64 = 200.0;
/// Non-significant marker size is `SIZE_SCALE * -log10(p)`.
pub const SIZE_SCALE: f64 = 100.0;

pub const SIGNIFICANT_SHAPE: &str = "*";
pub const DEFAULT_SHAPE: &str = "o";

/// Fold-change direction of a significant taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_fold_change(fc: f64) -> Self {
        if fc > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// GraPhlAn colour letter: red for enriched, blue for depleted.
    pub fn colour(self) -> &'static str {
        match self {
            Direction::Up => "r",
            Direction::Down => "b",
        }
    }
}

/// Marker derived from one differential record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub score: f64,
    pub significant: bool,
    pub size: f64,
    pub shape: &'static str,
    /// Set for significant taxa only.
    pub direction: Option<Direction>,
}

pub fn is_significant(score: f64) -> bool {
    score >= SIGNIFICANCE_THRESHOLD
}

pub fn marker_for(record: &DiffRecord, which: PValueColumn) -> Marker {
    let score = record.score(which);
    if is_significant(score) {
        Marker {
            score,
            significant: true,
            size: SIGNIFICANT_MARKER_SIZE,
            shape: SIGNIFICANT_SHAPE,
            direction: Some(Direction::from_fold_change(record.fold_change)),
        }
    } else {
        Marker {
            score,
            significant: false,
            size: SIZE_SCALE * score,
            shape: DEFAULT_SHAPE,
            direction: None,
        }
    }
}
