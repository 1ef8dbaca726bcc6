//! Heterogeneous values for node configuration and blackboard memory.
//!
//! Authored configuration is loosely shaped (numbers, strings, flags, nested
//! maps), so it is carried as JSON values and resolved into typed parameter
//! structs by each node type at construction.

/// A configuration or memory value.
pub type Value = serde_json::Value;

/// String-keyed bag of values (`properties`, `parameters`).
pub type Properties = serde_json::Map<String, Value>;
