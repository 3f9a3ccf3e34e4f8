pub mod cmd;
pub mod common;
