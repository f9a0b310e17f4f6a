//! Generic XML parsing and schema-less tabulation primitives used by
//! higher-level tools.
//!
//! [`parse`] builds an [`XmlNode`] tree, [`flatten`] collapses one subtree
//! into a [`FlatRow`], and [`tabulate`] turns a whole document into one
//! [`Table`] per distinct tag.

pub mod flatten;
pub mod format;
pub mod parser;
pub mod tabulate;
pub mod tree;

pub use flatten::{flatten, FlatRow, MULTI_VALUE_SEPARATOR};
pub use format::{format_json, format_summary, format_text};
pub use parser::{parse, parse_file, ParseError};
pub use tabulate::{tabulate, Placement, Table, TagSummary, Tabulation, ROOT_TABLE, SUMMARY_TABLE};
pub use tree::XmlNode;
