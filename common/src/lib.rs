//! Shared data model for the letter generation engine and its HTTP API.

pub mod model;
pub mod requests;
