#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod greeting;
pub mod web_utils;
