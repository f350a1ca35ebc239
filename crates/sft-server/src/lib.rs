//! Application glue for the sft file server and client.
//!
//! The protocol crates know nothing about files servers store or commands
//! clients issue; this crate adds that surface: a per-connection server
//! session dispatching `u` / `rl` / `rf` commands, the matching client
//! request helpers, credential files on disk, and storage-directory
//! handling.

#![forbid(unsafe_code)]

pub mod client;
pub mod commands;
pub mod identity;
pub mod session;
pub mod storage;
