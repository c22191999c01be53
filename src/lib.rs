//! Drive live host properties from OSC messages and stream them back out.
//!
//! A listener thread decodes UDP datagrams, routes them to callbacks and pushes
//! them onto a coalescing queue. The host drains that queue once per tick on its
//! main turn, so only the newest value per address is ever applied.

pub mod config;
pub mod controllers;
pub mod error;
pub mod host;
pub mod models;
pub mod services;
