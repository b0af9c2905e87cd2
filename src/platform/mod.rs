// statusmon - platform/mod.rs
//
// Platform abstraction layer: config loading and OS folder operations.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
