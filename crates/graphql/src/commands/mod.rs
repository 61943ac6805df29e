mod execute;
mod validate;

#[cfg(test)]
mod tests;

use crate::Cli;
use crate::CommandResult;
use execute::ExecuteCmd;
use validate::ValidateCmd;

#[derive(Debug, clap::Parser)]
#[command(name = "graphql")]
pub(crate) enum CommandEnum {
    /// Execute an operation against a schema, resolving every field from a
    /// JSON root value.
    Execute(Box<ExecuteCmd>),

    /// Load and validate a schema.
    Validate(Box<ValidateCmd>),
}
impl CommandEnum {
    pub(crate) async fn run(self, cli: Cli) -> CommandResult {
        match self {
            Self::Execute(cmd) => cmd.run(cli).await,
            Self::Validate(cmd) => cmd.run(cli).await,
        }
    }
}

/// Default for `--graphql-file-exts`.
pub(crate) fn default_graphql_file_exts() -> Vec<String> {
    vec!["graphql".to_string(), "graphqls".to_string()]
}
