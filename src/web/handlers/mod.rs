//! # Web API Request Handlers

pub mod auth;
pub mod health;
pub mod tasks;
