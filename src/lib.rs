//! Jump Tempo - match music tempo to measured jumping
//!
//! Streams of accelerometer samples are turned into a jumps-per-minute
//! rate, matched to the nearest supported tempo and answered with a track
//! from that tempo's catalog folder. A separate offline engine estimates
//! the tempo of audio files.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod motion;
pub mod service;
pub mod tempo;

pub use config::ServiceConfig;
pub use service::{LiveService, RequestHandler};
