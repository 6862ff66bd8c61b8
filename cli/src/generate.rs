#![deny(missing_docs)]

//! # Generate Command
//!
//! Runs the whole pipeline and writes `openapi.yaml` into the output directory.

use apidoc_core::{
    AnnotationExtractor, AnnotationTokenizer, App, AppResult, Configuration, OpenApiGenerator,
};
use std::path::PathBuf;

/// Where to look for annotations. Shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Root directory to scan.
    #[clap(short, long, env = "APIDOC_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// File holding @title, @version and @server, relative to --dir.
    #[clap(short, long, env = "APIDOC_MAIN")]
    pub main: PathBuf,

    /// Subtree scanned for @endpoint blocks, relative to --dir.
    #[clap(short, long, env = "APIDOC_ENDPOINTS", default_value = ".")]
    pub endpoints: PathBuf,

    /// Source extension to scan (repeatable). Defaults to common languages.
    #[clap(long = "ext")]
    pub extensions: Vec<String>,

    /// Report skipped files, unknown annotations and dropped endpoints.
    #[clap(short, long)]
    pub verbose: bool,
}

impl SourceArgs {
    /// Builds the run configuration.
    pub fn configuration(&self, output_dir: PathBuf) -> Configuration {
        Configuration {
            source_dir: self.dir.clone(),
            main_file: self.main.clone(),
            endpoints_root: self.endpoints.clone(),
            output_dir,
            verbose: self.verbose,
        }
    }

    /// Builds the orchestrator, honouring `--ext`.
    pub fn app(&self, output_dir: PathBuf) -> App {
        let config = self.configuration(output_dir);
        let extractor = AnnotationExtractor::new(&config).with_extensions(self.extensions.clone());
        App::with_collaborators(
            config,
            Box::new(extractor),
            Box::new(AnnotationTokenizer::new(self.verbose)),
            Box::new(OpenApiGenerator::new()),
        )
    }
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Directory receiving openapi.yaml.
    #[clap(short, long, env = "APIDOC_OUTPUT", default_value = "docs")]
    pub output: PathBuf,
}

/// Executes the generate command and returns the written path.
pub fn execute(args: &GenerateArgs) -> AppResult<PathBuf> {
    args.source.app(args.output.clone()).start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_generate_writes_document() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(
            src.path().join("main.rs"),
            "//! @title Demo\n//! @version 0.1.0\nfn main() {}\n",
        )
        .unwrap();
        fs::write(
            src.path().join("ping.rs"),
            "/// @endpoint GET /ping\n/// @response 204\nfn ping() {}\n",
        )
        .unwrap();

        let args = GenerateArgs {
            source: SourceArgs {
                dir: src.path().to_path_buf(),
                main: PathBuf::from("main.rs"),
                endpoints: PathBuf::from("."),
                extensions: vec!["rs".into()],
                verbose: false,
            },
            output: out.path().to_path_buf(),
        };

        let written = execute(&args).unwrap();
        let yaml = fs::read_to_string(written).unwrap();
        assert!(yaml.contains("/ping"));
        assert!(yaml.contains("No Content"));
    }
}
