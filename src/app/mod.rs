// statusmon - app/mod.rs
//
// Application layer: sinks, scanning, folder publishing, run orchestration.
// Dependencies: core and platform layers.

pub mod monitor;
pub mod publish;
pub mod scan;
pub mod sink;
