pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod frame;
pub mod init_config;
pub mod io;
pub mod particle;
pub mod simulation;
