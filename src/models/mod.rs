// src/models/mod.rs

pub mod questionnaire;
pub mod template;
