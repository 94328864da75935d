//! Command line tool to decode RLP encoded Ethereum blocks and check them against the proof of
//! work consensus rules.

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod cli;
pub mod commands;
pub mod file_client;
pub mod utils;
