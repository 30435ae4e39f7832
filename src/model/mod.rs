//! Core data model for decoded archive sections.

pub mod part;
