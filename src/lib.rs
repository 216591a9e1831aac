//! Arcade2D application library
//!
//! Layered configuration and the headless simulation system used by the
//! `arcade2d` binary.

pub mod config;
pub mod systems;
