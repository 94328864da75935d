//! Commands the `ethblock` executable runs.

pub mod check;
pub mod config;
pub mod decode;
