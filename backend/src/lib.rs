//! Letter template rendering and document generation for outgoing
//! correspondence.
//!
//! A letter moves through these modules in order:
//! - `catalog`: the template definitions and their field schemas;
//! - `editor`: the form values of one editing session;
//! - `substitution`: template body plus values into letter markup;
//! - `render`: markup into a one-page PDF;
//! - `submission`: the PDF and its metadata to the outgoing-letter endpoint.
//!
//! `services` exposes all of it over HTTP.

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod locale;
pub mod render;
pub mod services;
pub mod session_controller;
pub mod submission;
pub mod substitution;
