//! gRPC service implementation.
//!
//! - [`handler`] - the `IdAllocator` service (`AllocatorService`).

pub mod handler;
