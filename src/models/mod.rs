// src/models/mod.rs

pub mod like;
pub mod post;
pub mod user;
