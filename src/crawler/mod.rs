//! Crawler module for listing discovery and detail extraction
//!
//! This module contains the core harvest pipeline, including:
//! - The listing convergence loop that scrolls the feed
//! - Candidate collection from the rendered feed
//! - The sequential detail crawl
//! - Overall run coordination and progress observation

mod collector;
mod convergence;
mod coordinator;
mod detail;
mod observer;

pub use collector::CandidateCollector;
pub use convergence::{ConvergenceOutcome, ListingConvergence};
pub use coordinator::{Harvest, Harvester};
pub use detail::{DetailCrawler, DetailOutcome};
pub use observer::{HarvestObserver, TracingObserver};

