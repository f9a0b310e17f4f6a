//! Forcepoint SMC export conversion for FortiGate firewalls.
//!
//! This library turns a Forcepoint SMC XML export into FortiGate address,
//! address group, service and service group objects and pushes them through
//! the FortiOS REST API. Forcepoint names are free text while FortiOS names
//! are a restricted grammar, and Forcepoint exports reference predefined
//! objects they never define, so most of the work is naming and reference
//! resolution.
//!
//! # Architecture
//!
//! ## Naming & Resolution
//!
//! - [`names`]: FortiGate-safe names and the per-run name registry
//! - [`builtins`]: Forcepoint predefined objects and their FortiGate equivalents
//! - [`resolve`]: Reference resolution (document, built-in, unresolved)
//!
//! ## Extraction
//!
//! - [`record`]: Extracted object types, categories and CMDB payloads
//! - [`extract`]: Object extraction from a parsed export
//!
//! ## Push
//!
//! - [`store`]: Remote object store trait
//! - [`fortigate`]: FortiOS REST implementation of the store
//! - [`push`]: Push session and per-object upsert
//! - [`push_report`]: Outcomes, counts and export rows
//!
//! ## Output & Settings
//!
//! - [`report`]: Terminal rendering
//! - [`export`]: CSV and zip export
//! - [`config`]: TOML settings and environment overrides
//!
//! # Workflow
//!
//! 1. **Tabulate** the export to review every element (`xml-table-core`)
//! 2. **Extract** objects and review the rename list
//! 3. **Connect** to the FortiGate and **push** in dependency order
//! 4. **Report** what was created, updated, skipped or rejected
//!
//! # Examples
//!
//! ```ignore
//! use fpfg_convert::extract::{extract_objects, ExtractOptions};
//! use fpfg_convert::fortigate::{FortiGateClient, FortiGateConfig};
//! use fpfg_convert::push::PushSession;
//! use xml_table_core::parse_file;
//!
//! let root = parse_file("smc-export.xml".as_ref())?;
//! let extraction = extract_objects(&root, &ExtractOptions::default());
//!
//! let client = FortiGateClient::new(FortiGateConfig::new("192.0.2.1", "token"))?;
//! let mut session = PushSession::new(client);
//! session.connect()?;
//! let report = session.push(&extraction)?;
//! println!("errors: {}", report.totals.error);
//! ```
//!
//! # Built on xml-table-core
//!
//! Generic XML parsing, flattening and tabulation live in `xml-table-core`.
//! All Forcepoint and FortiGate knowledge is contained in this crate.

pub mod builtins;
pub mod config;
pub mod export;
pub mod extract;
pub mod fortigate;
pub mod names;
pub mod push;
pub mod push_report;
pub mod record;
pub mod report;
pub mod resolve;
pub mod store;
