// src/lib.rs

//! Sentinel: web page and feed change monitor library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
