//! Shared utilities and common types for the survey platform backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT token handling
//! - Offset pagination helpers
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
