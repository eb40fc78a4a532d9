//! CLI commands

mod changed;
mod completions;
mod init;
mod list;

pub use changed::ChangedCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use list::ListCommand;
