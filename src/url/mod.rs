//! URL handling module for Gleaner
//!
//! Candidates are identified by canonical URLs captured as plain values, so
//! every identifier stays valid after the page that rendered it is gone.

mod normalize;

pub use normalize::{build_search_url, canonical_candidate};
