#![deny(clippy::all, clippy::pedantic)]

pub mod auth;
pub mod ratings;
pub mod recipes;
