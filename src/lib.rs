//! # Food Coach Telegram Bot
//!
//! A Telegram bot that estimates the nutrition of a meal from a photo,
//! collects a short questionnaire to compute daily calorie and macro
//! targets, and compares each eaten portion against those targets.

pub mod advisor;
pub mod analysis;
pub mod analysis_errors;
pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod dialogue;
pub mod localization;
pub mod meal_store;
pub mod nutrition;
pub mod profile;
pub mod session;
