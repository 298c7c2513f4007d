//! Materialize phase - reads compiler output back as artifacts.

use std::path::{Path, PathBuf};

use jscc_core::{OutputArtifact, content_hash, rev_path};

use crate::{CompilationContext, Error, Phase, Result, context::OutputLayout};

/// Phase that turns the compiler's files into [`OutputArtifact`]s.
pub struct MaterializePhase;

impl Phase for MaterializePhase {
    fn name(&self) -> &'static str {
        "materialize"
    }

    fn description(&self) -> &'static str {
        "Read compiled output, fingerprint it and link source maps"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        if ctx.outcome.is_none() {
            return Err(Error::compiler("compiler output was not classified"));
        }
        let Some(layout) = ctx.layout.clone() else {
            return Err(Error::compiler("no output layout was marshaled"));
        };

        let root = ctx.workdir().to_path_buf();
        let fingerprint = ctx.options.fingerprint;

        let artifacts = match layout {
            OutputLayout::File {
                compiled,
                source_map,
            } => materialize_output(&root, &compiled, source_map.as_deref(), fingerprint)?,
            OutputLayout::Modules {
                prefix,
                source_maps,
            } => {
                let mut artifacts = Vec::new();
                for module in find_modules(&prefix)? {
                    let map = source_maps.then(|| module_map_path(&module));
                    artifacts.extend(materialize_output(
                        &root,
                        &module,
                        map.as_deref(),
                        fingerprint,
                    )?);
                }
                artifacts
            }
        };

        for artifact in &artifacts {
            tracing::info!(
                path = %artifact.path.display(),
                bytes = artifact.contents.len(),
                "emitting artifact"
            );
        }
        ctx.artifacts = artifacts;
        Ok(())
    }
}

/// Read one compiled file and, when requested, its source map.
///
/// Returns the compiled artifact followed by the map artifact. With
/// `fingerprint` both names carry the hash of the compiled bytes, and the
/// compiled bytes end with a `sourceMappingURL` comment naming the map.
pub fn materialize_output(
    root: &Path,
    compiled_path: &Path,
    source_map_path: Option<&Path>,
    fingerprint: bool,
) -> Result<Vec<OutputArtifact>> {
    let mut compiled = read_artifact(compiled_path)?;

    let hash = fingerprint.then(|| content_hash(&compiled));
    let output_path = match &hash {
        Some(hash) => rev_path(compiled_path, hash),
        None => compiled_path.to_path_buf(),
    };

    let Some(map_path) = source_map_path else {
        return Ok(vec![OutputArtifact::new(root, output_path, compiled)]);
    };

    let map = read_artifact(map_path)?;
    let map_output_path = match &hash {
        Some(hash) => rev_path(map_path, hash),
        None => map_path.to_path_buf(),
    };
    let map_name = map_output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    compiled.extend_from_slice(source_mapping_comment(&map_name).as_bytes());

    Ok(vec![
        OutputArtifact::new(root, output_path, compiled),
        OutputArtifact::new(root, map_output_path, map),
    ])
}

/// The trailing comment linking compiled code to its map.
pub fn source_mapping_comment(map_name: &str) -> String {
    format!("//# sourceMappingURL={}", map_name)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::ArtifactReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Module chunks written below `prefix`, in sorted order.
fn find_modules(prefix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}*.js", glob::Pattern::escape(prefix));
    let entries = glob::glob(&pattern).map_err(|source| Error::InvalidGlob {
        pattern: pattern.clone(),
        source,
    })?;

    let mut modules = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| Error::ArtifactReadFailed {
            path: err.path().to_path_buf(),
            source: err.into(),
        })?;
        if path.is_file() {
            modules.push(path);
        }
    }

    if modules.is_empty() {
        return Err(Error::ArtifactReadFailed {
            path: PathBuf::from(pattern),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "the compiler produced no module output",
            ),
        });
    }
    Ok(modules)
}

/// Map written next to a module via the `%outname%` placeholder.
fn module_map_path(module: &Path) -> PathBuf {
    let name = module
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    module.with_file_name(format!("{}.map", name))
}
