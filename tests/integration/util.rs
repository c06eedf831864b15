use std::process::Command;

const BATMOND_EXE_PATH: &str = env!("CARGO_BIN_EXE_batmond");

/// Returns a [`Command`] for a binary invocation of batmond.
pub fn batmond_command() -> Command {
    Command::new(BATMOND_EXE_PATH)
}
