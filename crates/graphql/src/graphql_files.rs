use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Result of scanning the paths passed on the command line for GraphQL
/// files.
#[derive(Debug, Default)]
pub(crate) struct GraphQLFiles {
    pub errors: Vec<anyhow::Error>,
    pub file_paths: Vec<PathBuf>,
    pub num_non_graphql_files: usize,
}

/// Recursively find every file at or under `paths` whose extension is one
/// of `exts` (with or without the leading `.`).
///
/// A single file argument is always included, even if its extension doesn't
/// match.
pub(crate) fn find(paths: &[PathBuf], exts: &[String]) -> GraphQLFiles {
    let exts: HashSet<String> = exts.iter()
        .map(|ext| ext.trim_start_matches('.').to_string())
        .collect();

    log::debug!("Scanning {} input paths...", paths.len());
    let mut found = GraphQLFiles::default();
    for path in paths {
        for entry in WalkDir::new(path.as_path()).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::trace!(
                        "Encountered an error while iterating recursive \
                        filesystem entities at/under {path:#?}."
                    );
                    found.errors.push(err.into());
                    continue;
                },
            };

            let entry_path = entry.path();
            if !entry.file_type().is_file() {
                log::trace!("Skipping non-file: {entry_path:#?}.");
                continue;
            }

            let matches_ext = entry_path.extension()
                .map(|ext| ext.to_string_lossy())
                .is_some_and(|ext| exts.contains(&*ext));
            if matches_ext {
                log::trace!("Found file at {entry_path:#?}.");
                push_canonical(&mut found, entry_path);
            } else {
                found.num_non_graphql_files += 1;
            }
        }
    }

    if found.file_paths.is_empty()
        && paths.len() == 1
        && let Some(first_arg_path) = paths.first()
        && first_arg_path.is_file() {
        log::warn!(
            "Proceeding with {first_arg_path:#?} even though it doesn't \
            match any of the expected file extensions ({}).",
            exts.iter()
                .map(|ext| format!("`.{ext}`"))
                .collect::<Vec<_>>()
                .join(", "),
        );
        found.num_non_graphql_files = found.num_non_graphql_files.saturating_sub(1);
        push_canonical(&mut found, first_arg_path);
    }

    log::debug!("Found {} GraphQL files.", found.file_paths.len());
    found
}

fn push_canonical(found: &mut GraphQLFiles, path: &Path) {
    match std::fs::canonicalize(path) {
        Ok(path) => found.file_paths.push(path),
        Err(err) => found.errors.push(
            anyhow::Error::new(err).context(format!("Failed to resolve {path:#?}")),
        ),
    }
}
