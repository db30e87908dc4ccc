// src/services/mod.rs

pub mod attempts;
pub mod catalog;
pub mod content;
pub mod progress;
