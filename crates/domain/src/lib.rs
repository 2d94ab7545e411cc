//! Domain layer for the survey platform backend.
//!
//! This crate contains:
//! - Request/response models with validation
//! - The role model and capability groups
//! - Pure domain services (versioning, name deduplication)

pub mod models;
pub mod services;
