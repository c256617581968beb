//! Gifthunt - a single-occasion birthday treasure hunt backend
//!
//! A REST API for a sequential puzzle hunt: players work through a catalog of
//! steps, each an ordered list of mini-games gated by a free-text final
//! answer. Completions earn points spendable in a gift shop; photos taken at
//! hunt locations get uploaded with decorative frame metadata.
//!
//! ## Layout
//!
//! - [`catalog`] - the immutable step/game content table
//! - [`game`] - the progression engine (the step/game state machine)
//! - [`store`] - SQLite persistence
//! - [`auth`], [`photos`] - sessions and photo uploads
//! - [`server`] - the `tiny_http` REST surface

pub mod auth;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod game;
pub mod photos;
pub mod server;
pub mod store;

pub use domain::*;
pub use error::AppError;
