pub mod gmt;
pub mod motifs;

pub use gmt::{gmt_to_rows, GmtConversion};
pub use motifs::{sanitise_motifs, MotifSet, MotifSummary, SanitisedMotifs};
