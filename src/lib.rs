//! `food-price` library crate.
//!
//! The binary (`fprice`) is a thin wrapper around this library so that:
//!
//! - the catalog, resolver and encoder are testable without spawning processes
//! - every front-end (form, prompts, scripted commands) shares one pipeline

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod encode;
pub mod error;
pub mod io;
pub mod models;
pub mod report;
pub mod tui;
