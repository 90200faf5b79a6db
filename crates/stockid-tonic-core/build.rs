//! Generates the gRPC client and server bindings for `proto/allocator.proto`.
//!
//! The encoded file descriptor set is written next to the generated code so
//! the server can register it with `tonic-reflection`.
//!
//! Requires `protoc` on the build host.

use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let descriptor_path = out_dir.join("stockid_descriptor.bin");

    tonic_prost_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["proto/allocator.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/allocator.proto");
    Ok(())
}
