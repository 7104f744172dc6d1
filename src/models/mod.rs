// src/models/mod.rs
pub mod status;
