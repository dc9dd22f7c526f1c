//! AgriLink onboarding core.
//!
//! Connects agricultural-value-chain participants to role-specific
//! profiles: role selection, cascading administrative-hierarchy lookups,
//! role-conditional validation, and an idempotent profile commit.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod onboarding;
pub mod profile;
pub mod roles;
pub mod secure;
pub mod store;
