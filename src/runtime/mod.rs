//! Launcher startup: configuration resolution through to the child's exit code.
mod startup;

pub use startup::{run_notebook, RuntimeExit};
