//! Unit tests for the process context.
