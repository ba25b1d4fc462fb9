//! ipfs-add: store local files and directory trees on IPFS
//!
//! A thin client for an IPFS gateway's HTTP command API plus a recursive path
//! adder that uploads files, materializes directory nodes from their links,
//! and reports each stored entry in post-order.

pub mod adder;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod dag;
pub mod error;
pub mod gateway;
pub mod logging;
