//! Trait abstractions for dependency injection
//!
//! Components declare their collaborators as constructor parameters
//! against these traits; tests substitute scripted implementations.

mod source;

pub use source::EventSource;
