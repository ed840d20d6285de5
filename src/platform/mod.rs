// LogMerge - platform/mod.rs
//
// Platform abstraction layer: filesystem naming and config directories.
// Dependencies: standard library, directories crate.
// Must NOT depend on: core, app.

pub mod config;
pub mod fs;
