//! Core engine: one scan per invocation, at most one proposed kick.

pub mod scanner;
