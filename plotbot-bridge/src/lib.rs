//! # plotbot-bridge — Websocket to Plotter Bridge
//!
//! Accepts drawing clients over websocket, translates their pen events
//! into plotter commands, and feeds them one at a time to the device
//! over its TCP request/response protocol.
//!
//! ## Components
//!
//! - **Config**: TOML configuration with CLI overrides.
//! - **Service**: listener, command consumer and graceful shutdown.

pub mod config;
pub mod service;
