//! Pull request activity pipeline: aggregation, enrichment, and ranking.
//!
//! Raw activity events are grouped into one aggregate per pull request,
//! missing fields are filled through follow-up GitHub calls, and rendered
//! summaries are ordered and truncated for output.

pub mod aggregate;
pub mod enrich;
pub mod rank;
