// LogMerge - core/mod.rs
//
// Core business logic layer: the record encoding and the streaming stages.
// Stages accept BufRead/Write trait objects and never open files themselves;
// discovery is the one exception and only reads directory entries.
// Must NOT depend on: app or platform.

pub mod discovery;
pub mod flatten;
pub mod lines;
pub mod model;
pub mod order;
pub mod pattern;
pub mod restore;
