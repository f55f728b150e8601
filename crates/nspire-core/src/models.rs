//! Domain models for the membership gateway.

pub mod identity;
pub mod subscription;
