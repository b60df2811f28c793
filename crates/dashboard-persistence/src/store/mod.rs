pub mod atomic_writer;
pub mod json_document_store;
pub mod memory_store;

pub use atomic_writer::AtomicWriter;
pub use json_document_store::JsonDocumentStore;
pub use memory_store::MemoryStore;
