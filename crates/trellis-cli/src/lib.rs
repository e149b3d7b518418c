//! Trellis command line: the demo application and the commands that drive it

pub mod commands;
pub mod demo;
