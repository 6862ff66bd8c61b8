#![deny(missing_docs)]

//! # Check Command
//!
//! Resolves everything without writing: prints the final route table, one
//! `METHOD /path  file:line` row per operation.

use crate::generate::SourceArgs;
use apidoc_core::{AppError, AppResult, Document};
use std::io::Write;

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub source: SourceArgs,
}

/// Executes the check command, writing the route table to `out`.
pub fn execute(args: &CheckArgs, out: &mut impl Write) -> AppResult<()> {
    // Nothing is written, so the output directory is irrelevant.
    let document = args.source.app(Default::default()).check()?;
    print_routes(&document, out).map_err(AppError::from)
}

fn print_routes(document: &Document, out: &mut impl Write) -> std::io::Result<()> {
    let width = document
        .endpoints
        .iter()
        .map(|e| e.path.len())
        .max()
        .unwrap_or(0);

    for endpoint in &document.endpoints {
        let method = endpoint.method.map(|m| m.as_str()).unwrap_or("?");
        writeln!(
            out,
            "{:<7} {:<width$}  {}",
            method,
            endpoint.path,
            endpoint.location,
            width = width
        )?;
    }
    writeln!(
        out,
        "{} operations, {} components",
        document.endpoints.len(),
        document.components.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_check_prints_route_table() {
        let src = tempfile::tempdir().unwrap();
        fs::write(
            src.path().join("app.py"),
            "# @title Demo\n# @version 1\n\n# @router admin /admin\n\n# @endpoint POST /users\n# @group admin\ndef create(): pass\n",
        )
        .unwrap();

        let args = CheckArgs {
            source: SourceArgs {
                dir: src.path().to_path_buf(),
                main: PathBuf::from("app.py"),
                endpoints: PathBuf::from("."),
                extensions: vec![],
                verbose: true,
            },
        };

        let mut out = Vec::new();
        execute(&args, &mut out).unwrap();
        let table = String::from_utf8(out).unwrap();

        assert!(table.starts_with("POST    /admin/users  app.py:6"));
        assert!(table.ends_with("1 operations, 0 components\n"));
        assert!(!src.path().join("docs").exists());
    }
}
