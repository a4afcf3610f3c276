//! Testing utilities for colpali-store.
//!
//! # Components
//!
//! - [`fixtures`]: Common records, vectors, and documents
//! - [`mock_server`]: HTTP server mimicking Pinecone's control and data planes

pub mod fixtures;
pub mod mock_server;

pub use mock_server::MockPineconeServer;
