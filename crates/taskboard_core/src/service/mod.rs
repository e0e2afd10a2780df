//! Core use-case services.
//!
//! # Responsibility
//! - Apply board use-cases on top of the domain model.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_store;
