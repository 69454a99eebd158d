//! TherapyConnect - web front-end for the therapy-booking platform
//!
//! This library provides the browser-facing layer: routing, page rendering,
//! client-side session state and the REST client for the remote backend.

pub mod backend;
pub mod calendar;
pub mod config;
pub mod flow;
pub mod models;
pub mod render;
pub mod state;
pub mod web;
