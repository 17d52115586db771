//! Endpoint-scoped subsets of OpenAPI 3.x documents.
//!
//! A [`Document`] answers endpoint queries over a parsed spec, and a
//! [`SchemaResolver`] computes the closed set of component schemas those
//! endpoints reach.

pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod parse;
pub mod resolve;
pub mod subset;

pub use document::{Document, EndpointOperation};
pub use resolve::{ResolveOptions, SchemaResolver};
pub use subset::extract_subset;
