// src/exec/mod.rs

//! Acting on launch directives.
//!
//! - [`backend`] defines the `Launcher` trait and the printing launcher.
//! - [`task_runner`] spawns detached `sh -c` workers.

pub mod backend;
pub mod task_runner;

pub use backend::{render_directive, LaunchReport, Launcher, PrintLauncher};
pub use task_runner::{ShellLauncher, ROLE_ENV, TASK_ID_ENV};
