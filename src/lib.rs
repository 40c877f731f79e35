pub mod app;
pub mod classifier;
pub mod cli;
pub mod command;
pub mod config;
pub mod output;
pub mod recorder;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod tests;
