//! Table-literal codec for portal documents.
//!
//! Every portal document is a Lua-style list of records, one table per
//! record, all values stored as strings:
//!
//! ```text
//! return {
//!     {
//!         group_name = "Example User Group",
//!         out_of_compliance_level = "0",
//!     },
//! }
//! ```
//!
//! Records decode to ordered field maps so fields this crate never
//! touches survive a rewrite. Rendering is deterministic: sorted keys,
//! double-quoted values, trailing commas. Scalars that arrive as bare
//! numbers or booleans are normalized to quoted strings on rewrite.

use std::collections::BTreeMap;

use thiserror::Error;

mod parser;
mod writer;

pub use parser::parse_records;
pub use writer::render_records;

/// One decoded record: field name to raw string value.
pub type RecordFields = BTreeMap<String, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unparseable table literal near `{near}`")]
    Syntax { near: String },
    #[error("table literal ended before the document was complete")]
    Truncated,
}
