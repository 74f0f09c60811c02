//! Collection orchestrator: concurrent fetch + extract, merge, dedup, cap.
//!
//! Every registry source is fetched and extracted in its own task (bounded
//! concurrency) alongside one social-collection task. After the full
//! barrier, contributions are merged in a single pass: social first, then
//! sources in registry order, so the first-registered source wins a shared
//! link. The merged list is deduplicated by trimmed link and capped.

pub mod collect;
pub mod dedup;

pub use collect::Collector;
pub use dedup::dedup_and_cap;
