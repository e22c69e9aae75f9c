//! Shared utility functions.
//!
//! - `numeric`: permissive integer coercion for API and CSV counters
//! - `json`: lenient scalar extraction from loosely typed JSON

mod json;
mod numeric;

pub use json::json_text;
pub use numeric::coerce_int;
