//! Reference storage backends
//!
//! Only the volatile in-memory backend lives here. The object-storage
//! backend ships in its own crate so that the AWS SDK stays optional.

pub mod memory;

pub use memory::MemoryStorage;
