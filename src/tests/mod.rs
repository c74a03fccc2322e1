//! Scenario tests for the whole fetch-cache-normalize-serve path.

mod support;
