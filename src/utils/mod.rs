// src/utils/mod.rs

pub mod cache;
pub mod hash;
pub mod jwt;
