//! Generator service
//!
//! Drives one run: read every manifest, parse it, fold its declarations into
//! a shared tree, then emit the generated C file in a single pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::error_ext::{IoResultExt, ManifestResultExt};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{emit, epilogue, parse_manifest, preamble, Declaration, Tree, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Service compiling manifests into static filesystem initialisers.
pub struct GeneratorService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl GeneratorService {
    /// Create a new generator service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Expand directory sources into the manifests they contain.
    ///
    /// File sources are kept as given; a directory contributes every file
    /// with the configured extension, in sorted path order.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_sources(&self, sources: &[PathBuf]) -> ApplicationResult<Vec<PathBuf>> {
        let mut resolved = Vec::new();
        for source in sources {
            if self.fs.is_dir(source) {
                let files = self
                    .fs
                    .manifest_files(source, &self.settings.manifest_extension)
                    .with_path_context("scan manifest directory", source)?;
                if files.is_empty() {
                    warn!(
                        "no *.{} manifests in {}",
                        self.settings.manifest_extension,
                        source.display()
                    );
                }
                resolved.extend(files);
            } else {
                resolved.push(source.clone());
            }
        }
        Ok(resolved)
    }

    /// Read and parse a single manifest.
    #[instrument(level = "debug", skip(self))]
    pub fn load_manifest(&self, path: &Path) -> ApplicationResult<Vec<Declaration>> {
        let text = self
            .fs
            .read_to_string(path)
            .map_err(|source| ApplicationError::ReadSource {
                path: path.to_path_buf(),
                source,
            })?;
        parse_manifest(&text).in_manifest(path)
    }

    /// Fold all sources, in order, into one tree.
    pub fn build_tree(&self, sources: &[PathBuf]) -> ApplicationResult<Tree> {
        let mut builder = TreeBuilder::new();
        for path in self.resolve_sources(sources)? {
            let declarations = self.load_manifest(&path)?;
            debug!(
                "{}: {} declarations",
                path.display(),
                declarations.len()
            );
            builder.extend(&declarations).in_manifest(&path)?;
        }
        let tree = builder.finish();
        info!("tree holds {} handler bindings", tree.handler_count());
        Ok(tree)
    }

    /// Render the complete generated file for `tree`.
    pub fn render(&self, tree: &Tree) -> ApplicationResult<String> {
        let options = self.settings.emit.to_options();
        let emission = emit(tree, &options)?;

        let mut out = preamble(&options);
        out.push_str(&emission.text);
        out.push_str(&epilogue(&options));
        Ok(out)
    }

    /// Build the tree from `sources` and render it.
    ///
    /// Nothing is written here; a failure leaves no partial output anywhere.
    #[instrument(level = "info", skip(self))]
    pub fn generate(&self, sources: &[PathBuf]) -> ApplicationResult<String> {
        let tree = self.build_tree(sources)?;
        self.render(&tree)
    }

    /// Replace `dest` with `content` atomically.
    pub fn write_output(&self, dest: &Path, content: &str) -> ApplicationResult<()> {
        self.fs
            .write_atomic(dest, content)
            .map_err(|source| ApplicationError::WriteOutput {
                path: dest.to_path_buf(),
                source,
            })?;
        info!("wrote {} bytes to {}", content.len(), dest.display());
        Ok(())
    }
}
