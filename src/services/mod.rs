// src/services/mod.rs

pub mod quiz_session;
pub mod scoring;
