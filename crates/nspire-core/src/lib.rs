//! NSPIRE Core — domain models, error taxonomy and the collaborator
//! traits shared by every crate in the membership gateway.

pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
