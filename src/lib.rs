//! Socratic Dialogue - Stage-driven argumentation tutoring
//!
//! This crate drives a student through a bounded Socratic dialogue (stance,
//! counter-cases, underlying principles, closure) using a language model as a
//! stateless text generator whose structured output decides each transition.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
