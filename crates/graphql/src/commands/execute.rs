use crate::Cli;
use crate::CommandResult;
use crate::RunnableCommand;
use crate::commands::default_graphql_file_exts;
use crate::graphql_files;
use crate::output_utils;
use anyhow::Context;
use futures::Stream;
use futures::StreamExt;
use libgraphql::Schema;
use libgraphql::ast;
use libgraphql::execution::ExecutableSchema;
use libgraphql::execution::Executor;
use libgraphql::execution::ExecutionResult;
use libgraphql::execution::ExecutorConfig;
use libgraphql::execution::Request;
use libgraphql::execution::Response;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, clap::Args)]
pub(crate) struct ExecuteCmd {
    #[arg(
        help="JSON file with executor settings (see `ExecutorConfig`).",
        long,
    )]
    config: Option<PathBuf>,

    #[arg(
        default_values_t=default_graphql_file_exts(),
        help="Set of file extensions to filter to when searching for schema \
             files within a directory.",
        long,
        value_delimiter = ',',
    )]
    graphql_file_exts: Vec<String>,

    #[arg(
        help="Overrides `max_concurrent_resolvers` from --config.",
        long,
    )]
    max_concurrent_resolvers: Option<usize>,

    #[arg(
        help="Name of the operation to execute when the query file defines \
             more than one.",
        long,
    )]
    operation_name: Option<String>,

    #[arg(
        help="File containing the executable GraphQL document.",
        long,
    )]
    query: PathBuf,

    #[arg(
        help="JSON file whose contents are the root value. Fields are \
             resolved by reading same-named properties off of their parent.",
        long,
    )]
    root_value: Option<PathBuf>,

    #[arg(
        help="Paths to the GraphQL schema files or directories containing \
             them.",
        long,
        num_args=1..,
        required=true,
    )]
    schema: Vec<PathBuf>,

    #[arg(
        help="JSON file containing an object of variable values.",
        long,
    )]
    variables: Option<PathBuf>,
}
impl ExecuteCmd {
    fn load_config(&self) -> anyhow::Result<ExecutorConfig> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_value(read_json(path)?)
                .with_context(|| format!("Invalid executor config in {path:#?}"))?,
            None => ExecutorConfig::default(),
        };
        if let Some(max_concurrent_resolvers) = self.max_concurrent_resolvers {
            config.max_concurrent_resolvers = max_concurrent_resolvers;
        }
        log::debug!("Executor config: {config:?}");
        Ok(config)
    }

    fn load_request(&self) -> anyhow::Result<Request> {
        let found = graphql_files::find(&self.schema, &self.graphql_file_exts);
        if let Some(err) = found.errors.into_iter().next() {
            return Err(err.context("Failed to find schema files"));
        }
        let schema = Schema::builder()
            .load_files(found.file_paths)
            .and_then(|builder| builder.build())
            .context("Failed to build the schema")?;
        let schema = ExecutableSchema::builder(Arc::new(schema))
            .build()
            .context("Failed to build the executable schema")?;

        let query = std::fs::read_to_string(&self.query)
            .with_context(|| format!("Failed to read {:#?}", self.query))?;
        let document = ast::operation::parse(&query)
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("Failed to parse {:#?}", self.query))?;

        let mut request = Request::new(Arc::new(schema), Arc::new(document));
        if let Some(operation_name) = &self.operation_name {
            request = request.operation_name(operation_name.as_str());
        }
        if let Some(path) = &self.root_value {
            request = request.root_value(read_json(path)?);
        }
        if let Some(path) = &self.variables {
            let serde_json::Value::Object(variables) = read_json(path)? else {
                anyhow::bail!("{path:#?} must contain a JSON object");
            };
            request = request.variables(variables);
        }
        Ok(request)
    }
}

#[inherent::inherent]
impl RunnableCommand for ExecuteCmd {
    pub async fn run(self, _cli: Cli) -> CommandResult {
        let (config, request) = match self.load_config().and_then(|config| {
            Ok((config, self.load_request()?))
        }) {
            Ok(loaded) => loaded,
            Err(err) => return err.into(),
        };

        let executor = Executor::new(config);
        match executor.execute(request).await {
            Response::Single(result) => {
                let json = output_utils::pretty_json(&result.to_json());
                if result.data().is_none_or(|data| data.is_null()) {
                    CommandResult::stdout_failure(format_args!("{json}"))
                } else {
                    CommandResult::stdout(format_args!("{json}"))
                }
            },

            Response::Stream(payloads) => {
                match write_payloads(payloads, &mut std::io::stdout()).await {
                    Ok(count) => {
                        log::debug!("Wrote {count} payloads.");
                        CommandResult::success()
                    },
                    Err(err) => anyhow::Error::new(err)
                        .context("Failed to write a payload to stdout")
                        .into(),
                }
            },
        }
    }
}

/// Write each payload to `out` as soon as it arrives.
pub(crate) async fn write_payloads<W: Write>(
    mut payloads: impl Stream<Item = ExecutionResult> + Unpin,
    out: &mut W,
) -> std::io::Result<usize> {
    let mut count = 0;
    while let Some(payload) = payloads.next().await {
        count += 1;
        log::debug!("Received payload #{count}.");
        writeln!(out, "{}", output_utils::pretty_json(&payload.to_json()))?;
        out.flush()?;
    }
    Ok(count)
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {path:#?}"))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {path:#?} as JSON"))
}
