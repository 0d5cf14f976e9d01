pub mod criteria;
pub mod errors;
pub mod pattern;

pub use criteria::{Query, WherePair};
pub use errors::QueryError;
pub use pattern::Pattern;
