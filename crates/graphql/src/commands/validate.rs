use crate::Cli;
use crate::CommandResult;
use crate::RunnableCommand;
use crate::commands::default_graphql_file_exts;
use crate::graphql_files;
use crate::output_utils;
use libgraphql::Schema;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub(crate) struct ValidateCmd {
    #[arg(
        default_values_t=default_graphql_file_exts(),
        help="Set of file extensions to filter to when searching for files \
             within a directory.",
        long,
        value_delimiter = ',',
    )]
    graphql_file_exts: Vec<String>,

    #[arg(
        help="Paths to one or more GraphQL files or directories containing \
             GraphQL files which need to be validated.",
        name="FILE_OR_DIR_PATHS",
        required=true,
    )]
    file_or_dir_paths: Vec<PathBuf>,
}

#[inherent::inherent]
impl RunnableCommand for ValidateCmd {
    pub async fn run(self, _cli: Cli) -> CommandResult {
        let found = graphql_files::find(&self.file_or_dir_paths, &self.graphql_file_exts);
        if !found.errors.is_empty() {
            return CommandResult::stderr(format_args!(
                "{} GraphQL validation errors: {:#?}",
                output_utils::RED_X,
                found.errors,
            ));
        }

        match Schema::builder().load_files(found.file_paths.clone()) {
            Ok(builder) => match builder.build() {
                Ok(schema) => CommandResult::stdout(format_args!(
                    concat!(
                        "{} All GraphQL validated successfully:\n",
                        "  * Analyzed {} files.\n",
                        "  * Skipped {} non-graphql files.\n",
                        "  * Validated {} type definitions.\n",
                        "  * Validated {} directive definitions.",
                    ),
                    output_utils::GREEN_CHECK,
                    found.file_paths.len(),
                    found.num_non_graphql_files,
                    schema.defined_types().count(),
                    schema.defined_directives().len(),
                )),

                Err(err) => CommandResult::stderr(format_args!(
                    "{} Errors validating schema: {err:#?}",
                    output_utils::RED_X,
                )),
            },

            Err(err) => CommandResult::stderr(format_args!(
                "{} Errors loading schema files: {err:#?}",
                output_utils::RED_X,
            )),
        }
    }
}
