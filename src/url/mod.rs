//! URL handling module for Fathom
//!
//! This module provides link resolution against a page address, link
//! normalization for deduplication, seed validation, and the filters that
//! decide which discovered links are worth following.

mod filter;
mod normalize;
mod resolve;

pub use filter::{has_denied_extension, is_candidate, is_followable};
pub use normalize::{normalize_link, parse_seed};
pub use resolve::resolve_link;

pub(crate) use resolve::resolve_against;
