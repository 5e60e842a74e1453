//! Core types and definitions for the emberfx particle engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! module configuration, curves, driver commands, events, snapshots and
//! constants. It has no dependency on the simulation runtime.

pub mod commands;
pub mod constants;
pub mod curves;
pub mod enums;
pub mod error;
pub mod events;
pub mod modules;
pub mod state;
pub mod types;
