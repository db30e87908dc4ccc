// src/handlers/mod.rs

pub mod auth;
pub mod courses;
pub mod lessons;
pub mod modules;
pub mod progress;
pub mod tests;
