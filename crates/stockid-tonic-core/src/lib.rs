#![doc = include_str!("../README.md")]

mod client;
mod common;

pub use client::*;
pub use common::*;
// Public re-export so downstream crates can reach the core types via
// `stockid_tonic_core::stockid`.
pub use stockid;

/// Generated protobuf messages and gRPC service bindings.
pub mod proto {
    tonic::include_proto!("stockid");

    /// Encoded file descriptor set, for `tonic-reflection`.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("stockid_descriptor");
}
