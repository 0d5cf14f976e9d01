pub mod engine;
pub mod matcher;

pub use engine::{run, scan, Flow};
pub use matcher::{match_any, match_pairs, match_value, satisfied_pairs, section_matches};
