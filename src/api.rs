#![forbid(unsafe_code)]

pub mod dispatch;
pub mod hello;
