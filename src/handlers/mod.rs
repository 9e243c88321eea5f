// src/handlers/mod.rs

pub mod daily;
pub mod exam;
pub mod mistakes;
pub mod practice;
pub mod progress;
pub mod quiz;
