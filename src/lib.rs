//! fitplan — personalized fitness-plan generation and email delivery.

pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod mailer;
pub mod profile;
pub mod proxy;
pub mod routes;
