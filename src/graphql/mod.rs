//! GraphQL transport (C12, spec.md §6).

pub mod schema;
pub mod types;

pub use schema::{build_schema, AppState, ChildcareSchema, Mutation, Query};
