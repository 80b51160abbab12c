//! ATS compatibility scanner: scores a plain-text resume against a plain-text
//! job description and serves the score over HTTP.

pub mod config;
pub mod errors;
pub mod routes;
pub mod scoring;
pub mod state;
