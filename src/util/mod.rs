// src/util/mod.rs
pub mod retry;
