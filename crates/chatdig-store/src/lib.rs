//! Record source abstraction and dump-directory backend for chatdig.
//!
//! The export pipeline only needs, per logical database, a lazy sequence of
//! already-deserialized values for each of the three record stores. How the
//! values got onto disk is the backend's business.

pub mod dump;
pub mod error;
pub mod memory;
pub mod source;

pub use dump::DumpStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use source::{RecordIter, RecordSource, StoreName};
