// LogMerge - app/mod.rs
//
// Application layer: worker pool, file-level stages, orchestration, cleanup.
// Dependencies: core, platform, util.

pub mod cleanup;
pub mod merge;
pub mod pipeline;
pub mod pool;
