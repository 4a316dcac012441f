//! Command-line front end for the chatmark lexer and renderer

pub mod cli;
pub mod commands;
