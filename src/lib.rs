pub mod checkers;
pub mod cli;
pub mod config;
pub mod engine;
pub mod parser;
pub mod types;
