pub mod assign;
pub mod config;
pub mod hash;
