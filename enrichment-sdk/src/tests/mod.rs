//! Unit tests for the enrichment SDK
//!
//! Adapter tests run against WireMock servers; orchestration tests use the
//! in-process fakes from `fakes` and a `ManualClock`.

pub mod fakes;

pub mod config_tests;
pub mod error_tests;
pub mod gigachat_mock_tests;
pub mod text_mock_tests;
