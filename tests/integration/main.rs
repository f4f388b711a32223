// tests/integration/main.rs

#[path = "../common/mod.rs"]
mod common;

mod error_handling;
mod fs_abstraction;
mod state_persistence;
mod wave_flow;
