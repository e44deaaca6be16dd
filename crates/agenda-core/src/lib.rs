//! Core types for the agenda scheduling engines.
//!
//! Models, time-range math, configuration, and the core error type.
//! Everything here is pure data and computation; storage and transport
//! live in other crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod time;
