//! Integration tests for Gleaner
//!
//! `pipeline_tests` drive the full harvest through the scripted in-memory
//! session from `gleaner::testing`; `webdriver_tests` exercise the WebDriver
//! session against a wiremock server.

mod pipeline_tests;
mod webdriver_tests;
