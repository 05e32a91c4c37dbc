// src/handlers/mod.rs

pub mod questionnaire;
pub mod template;
