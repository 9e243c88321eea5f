// src/models/mod.rs

pub mod daily;
pub mod exam_record;
pub mod practice;
pub mod progress;
pub mod question;
pub mod quiz;
