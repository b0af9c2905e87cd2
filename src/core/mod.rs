// statusmon - core/mod.rs
//
// Core business logic layer: parsing, the time window, admission rules and
// path-to-user resolution.
// Must NOT depend on: platform or app.

pub mod filter;
pub mod identity;
pub mod model;
pub mod parser;
pub mod window;
