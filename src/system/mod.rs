//! Access to the host: shell commands and the probes built on them

pub mod command;
pub mod prober;

pub use command::{CommandOutput, CommandRunner, ShellRunner, COMMAND_TIMEOUT, TIMEOUT_MARKER};
pub use prober::{CommandProber, SystemProber};

#[cfg(test)]
#[path = "command_test.rs"]
mod command_tests;

#[cfg(test)]
#[path = "prober_test.rs"]
mod prober_tests;
