//! Workflow implementations grouped per business capability.

pub mod compliance;
