pub mod emit;
pub mod labels;
pub mod significance;

pub use emit::{annotate, AnnotateOptions, Annotations};
pub use labels::LabelTagger;
pub use significance::{marker_for, Direction, Marker, SIGNIFICANCE_THRESHOLD};
