//! Shared primitive types used across the insights engine.

/// Identifier of one upstream batch segmentation run.
pub type RunId = i64;

/// A customer segment. Small non-negative integers in practice.
pub type ClusterId = i64;

/// Customer identifiers are opaque text (e.g. "C001").
pub type CustomerId = String;

/// Identifier of a single recommendation row.
pub type RecommendationId = i64;
