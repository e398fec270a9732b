//! Cross-module test suite: schedule invariants and the request-to-plan path.
