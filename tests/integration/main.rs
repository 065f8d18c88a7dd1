//! Integration tests for the escrow keeper, run against an in-memory chain.

mod scan_scenarios;
