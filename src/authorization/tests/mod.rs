//! Unit tests for the authorization context.
