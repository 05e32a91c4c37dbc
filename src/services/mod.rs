// src/services/mod.rs

pub mod listing;

pub use listing::ListingService;
