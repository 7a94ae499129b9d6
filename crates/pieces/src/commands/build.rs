//! `pieces build` command implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use glob::Pattern;
use pieces_config::{CliSettings, Config, DocsConfig};
use pieces_markup::{BuildOutput, BuildWarning, Engine, IndexGroup, SourceDocument, Taxonomies};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;

/// Output format for the build result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Human-readable index listing.
    #[default]
    Text,
    /// Index and warnings as JSON.
    Json,
}

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover pieces.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output (show per-document logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the source directory
    /// cannot be searched. Unreadable files and skipped markup occurrences
    /// are reported as warnings only.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let mut engine = Engine::new(&config.taxonomies())?;
        let Discovered { documents, skipped } = discover_documents(&config.docs_resolved)?;

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Taxonomies: {}, documents: {}",
            engine.taxonomies().len(),
            documents.len()
        ));

        for file in &skipped {
            output.warning(&format!(
                "WARNING: skipped {}: {}",
                file.path.display(),
                file.reason
            ));
        }

        let build = engine.build(&documents);

        for warning in build.warnings() {
            output.warning(&format!("WARNING: {warning}"));
        }

        match self.format {
            Format::Text => print_text(&output, engine.taxonomies()),
            Format::Json => {
                let report = BuildReport::new(engine.taxonomies(), &build);
                output.print(&serde_json::to_string_pretty(&report)?);
            }
        }

        output.success(&format!(
            "Built {} documents: {} objects, {} warnings",
            build.documents.len(),
            engine.object_count(),
            build.warnings().count()
        ));
        Ok(())
    }
}

/// JSON output of a build.
#[derive(Serialize)]
struct BuildReport<'a> {
    taxonomies: Vec<TaxonomyIndex<'a>>,
    warnings: Vec<&'a BuildWarning>,
}

#[derive(Serialize)]
struct TaxonomyIndex<'a> {
    name: &'a str,
    kinds: &'a [String],
    index: Vec<IndexGroup>,
}

impl<'a> BuildReport<'a> {
    fn new(taxonomies: &'a Taxonomies, build: &'a BuildOutput) -> Self {
        Self {
            taxonomies: taxonomies
                .iter()
                .map(|taxonomy| TaxonomyIndex {
                    name: taxonomy.name(),
                    kinds: taxonomy.kinds(),
                    index: taxonomy.build_index(),
                })
                .collect(),
            warnings: build.warnings().collect(),
        }
    }
}

fn print_text(output: &Output, taxonomies: &Taxonomies) {
    for taxonomy in taxonomies.iter() {
        output.heading(&format!(
            "{} ({})",
            taxonomy.name(),
            taxonomy.kinds().join(", ")
        ));
        let index = taxonomy.build_index();
        if index.is_empty() {
            output.print("  (empty)");
        }
        for group in index {
            output.print(&format!("  {}", group.letter));
            for object in &group.entries {
                output.print(&format!(
                    "    {} [{}] {}#{}",
                    object.name, object.kind, object.document_id, object.anchor_id
                ));
            }
        }
    }
}

/// Documents found below the source directory.
#[derive(Debug, Default)]
struct Discovered {
    /// Documents sorted by id.
    documents: Vec<SourceDocument>,
    /// Files that matched but could not be read.
    skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
struct SkippedFile {
    path: PathBuf,
    reason: String,
}

impl Discovered {
    fn skip(&mut self, path: PathBuf, reason: String) {
        tracing::warn!(path = %path.display(), error = %reason, "Skipping unreadable document");
        self.skipped.push(SkippedFile { path, reason });
    }
}

/// Find every document below the source directory.
///
/// Documents are sorted by id. If two files map to the same id (e.g.
/// `guide.rst` and `guide.txt`), the first extension listed in the config
/// wins. Files that cannot be read as UTF-8 text are skipped.
fn discover_documents(docs: &DocsConfig) -> Result<Discovered, CliError> {
    if !docs.source_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "source directory does not exist: {}",
            docs.source_dir.display()
        )));
    }

    let root = Pattern::escape(&docs.source_dir.to_string_lossy());
    let mut seen = HashSet::new();
    let mut discovered = Discovered::default();

    for extension in &docs.extensions {
        for entry in glob::glob(&format!("{root}/**/*.{extension}"))? {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    discovered.skip(err.path().to_path_buf(), err.error().to_string());
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let id = document_id(&docs.source_dir, &path);
            if !seen.insert(id.clone()) {
                tracing::warn!(path = %path.display(), document = %id, "Duplicate document id, skipping");
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => discovered.documents.push(SourceDocument::new(id, text)),
                Err(err) => discovered.skip(path, err.to_string()),
            }
        }
    }

    discovered.documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(discovered)
}

/// Document id: path relative to the source directory, without extension,
/// with `/` separators.
fn document_id(source_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(source_dir).unwrap_or(path);
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
