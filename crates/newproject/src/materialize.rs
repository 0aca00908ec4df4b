//! Project materialization
//!
//! Copies the template tree into a fresh directory named after the plugin,
//! renaming the main source file and rewriting identifiers in it, in
//! `plugin.json` and (plugin name only) in `dub.json`. Everything else is
//! copied byte for byte.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::MaterializeError;
use crate::identity::PluginIdentity;
use crate::substitution::{Placeholders, Rewrite, Substitutions, Syntax};

/// Default template directory name
pub const DEFAULT_TEMPLATE: &str = "example-plugin";

/// Default prefix identifying the template's main source file
pub const DEFAULT_MAIN_SOURCE_PREFIX: &str = "example";

const PLUGIN_JSON: &str = "plugin.json";
const DUB_JSON: &str = "dub.json";

/// What a run would do, resolved without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Directory that will be created
    pub destination: PathBuf,
    /// Main source file name inside the template
    pub main_source: String,
    /// Name the main source file gets in the destination
    pub main_target: String,
}

/// A file whose content was rewritten
#[derive(Debug, Clone, Serialize)]
pub struct RewrittenFile {
    /// Path relative to the destination
    pub path: PathBuf,
    pub replacements: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct MaterializeReport {
    pub destination: PathBuf,
    /// Main source file name in the destination
    pub main_source: String,
    /// Files copied without changes
    pub files_copied: usize,
    pub rewritten: Vec<RewrittenFile>,
}

/// Creates plugin projects from a template directory
#[derive(Debug, Clone)]
pub struct Materializer {
    template: PathBuf,
    output: PathBuf,
    placeholders: Placeholders,
    main_source_prefix: String,
}

impl Materializer {
    /// Materializer writing projects into `output`
    pub fn new(template: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
            placeholders: Placeholders::default(),
            main_source_prefix: DEFAULT_MAIN_SOURCE_PREFIX.to_string(),
        }
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn with_main_source_prefix(mut self, prefix: &str) -> Self {
        self.main_source_prefix = prefix.to_string();
        self
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Check everything that can be checked without writing
    pub fn plan(&self, identity: &PluginIdentity) -> Result<Plan> {
        identity.validate()?;

        if !self.template.is_dir() {
            bail!(MaterializeError::TemplateNotFound(self.template.clone()));
        }

        let dest_name = identity.destination_name();
        let destination = self.output.join(&dest_name);
        if destination.symlink_metadata().is_ok() {
            bail!(MaterializeError::DestinationExists(destination));
        }

        let main_source = self.find_main_source()?;
        let main_target = match Path::new(&main_source).extension() {
            Some(ext) => format!("{}.{}", dest_name, ext.to_string_lossy()),
            None => dest_name,
        };

        Ok(Plan {
            destination,
            main_source,
            main_target,
        })
    }

    /// Create the project
    ///
    /// Fails before writing anything if the destination already exists. A
    /// failure partway through leaves the partial tree in place.
    pub fn materialize(&self, identity: &PluginIdentity) -> Result<MaterializeReport> {
        let plan = self.plan(identity)?;
        let subs = Substitutions::new(identity, &self.placeholders)?;

        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create output directory: {}", self.output.display()))?;

        // create_dir (not create_dir_all) so a directory that appeared since
        // plan() is still refused
        if let Err(e) = fs::create_dir(&plan.destination) {
            if e.kind() == io::ErrorKind::AlreadyExists {
                bail!(MaterializeError::DestinationExists(plan.destination));
            }
            return Err(e).with_context(|| {
                format!("Failed to create destination: {}", plan.destination.display())
            });
        }

        info!(
            "Materializing {} from {}",
            plan.destination.display(),
            self.template.display()
        );

        let mut report = MaterializeReport {
            destination: plan.destination.clone(),
            main_source: plan.main_target.clone(),
            files_copied: 0,
            rewritten: Vec::new(),
        };
        let mut seen_plugin_json = false;
        let mut seen_dub_json = false;

        // Output inside the template: never walk into the new project
        let nested = nested_destination(&self.template, &plan.destination)?;

        for entry in WalkDir::new(&self.template)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| match (&nested, e.path().strip_prefix(&self.template)) {
                (Some(skip), Ok(rel)) => rel != skip.as_path(),
                _ => true,
            })
        {
            let entry = entry
                .with_context(|| format!("Failed to read template: {}", self.template.display()))?;
            let src_path = entry.path();
            let rel_path = src_path.strip_prefix(&self.template)?;

            if entry.file_type().is_dir() {
                let dest_path = plan.destination.join(rel_path);
                fs::create_dir_all(&dest_path)
                    .with_context(|| format!("Failed to create directory: {}", dest_path.display()))?;
                continue;
            }

            let top_level = entry.depth() == 1;
            let name = entry.file_name().to_string_lossy();

            let rewrite = if top_level && name == plan.main_source.as_str() {
                let dest_rel = PathBuf::from(&plan.main_target);
                let rewrite = rewrite_file(src_path, &plan.destination.join(&dest_rel), |text| {
                    subs.apply(text, Syntax::Source)
                })?;
                Some((dest_rel, rewrite))
            } else if top_level && name == PLUGIN_JSON {
                seen_plugin_json = true;
                let rewrite = rewrite_file(src_path, &plan.destination.join(rel_path), |text| {
                    subs.apply(text, Syntax::Json)
                })?;
                check_json(PLUGIN_JSON, &rewrite.text);
                Some((rel_path.to_path_buf(), rewrite))
            } else if top_level && name == DUB_JSON {
                seen_dub_json = true;
                let rewrite = rewrite_file(src_path, &plan.destination.join(rel_path), |text| {
                    subs.apply_plugin_name_only(text, Syntax::Json)
                })?;
                check_json(DUB_JSON, &rewrite.text);
                Some((rel_path.to_path_buf(), rewrite))
            } else {
                None
            };

            match rewrite {
                Some((path, rewrite)) => {
                    for field in rewrite.unmatched() {
                        warn!(
                            "Placeholder for {} ('{}') not found in {}",
                            field.label(),
                            self.placeholders.token(field),
                            path.display()
                        );
                    }
                    info!("Rewrote {} ({} replacements)", path.display(), rewrite.replacements());
                    report.rewritten.push(RewrittenFile {
                        path,
                        replacements: rewrite.replacements(),
                    });
                }
                None => {
                    let dest_path = plan.destination.join(rel_path);
                    debug!("Copying {}", rel_path.display());
                    fs::copy(src_path, &dest_path).with_context(|| {
                        format!(
                            "Failed to copy {} to {}",
                            src_path.display(),
                            dest_path.display()
                        )
                    })?;
                    report.files_copied += 1;
                }
            }
        }

        if !seen_plugin_json {
            warn!("Template has no {}; nothing to rewrite there", PLUGIN_JSON);
        }
        if !seen_dub_json {
            warn!("Template has no {}; nothing to rewrite there", DUB_JSON);
        }

        Ok(report)
    }

    /// The single top-level file whose name starts with the main source prefix
    fn find_main_source(&self) -> Result<String> {
        let mut candidates = Vec::new();

        for entry in fs::read_dir(&self.template)
            .with_context(|| format!("Failed to read template: {}", self.template.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&self.main_source_prefix) && entry.path().is_file() {
                candidates.push(name);
            }
        }

        candidates.sort();

        match candidates.len() {
            0 => bail!(MaterializeError::MainSourceNotFound {
                prefix: self.main_source_prefix.clone(),
                template: self.template.clone(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => bail!(MaterializeError::AmbiguousMainSource(candidates)),
        }
    }
}

/// Read `src`, transform its text and write it to `dest` with the source's permissions
fn rewrite_file(
    src: &Path,
    dest: &Path,
    transform: impl FnOnce(&str) -> Result<Rewrite>,
) -> Result<Rewrite> {
    let content = fs::read_to_string(src)
        .with_context(|| format!("Failed to read: {}", src.display()))?;

    let rewrite = transform(&content)?;

    fs::write(dest, &rewrite.text)
        .with_context(|| format!("Failed to write: {}", dest.display()))?;

    let perms = fs::metadata(src)
        .with_context(|| format!("Failed to read metadata: {}", src.display()))?
        .permissions();
    fs::set_permissions(dest, perms)
        .with_context(|| format!("Failed to set permissions on: {}", dest.display()))?;

    Ok(rewrite)
}

/// Path of `destination` relative to `template` when it lies inside it
fn nested_destination(template: &Path, destination: &Path) -> Result<Option<PathBuf>> {
    let template = template
        .canonicalize()
        .with_context(|| format!("Failed to resolve template: {}", template.display()))?;
    let destination = destination
        .canonicalize()
        .with_context(|| format!("Failed to resolve destination: {}", destination.display()))?;

    Ok(destination
        .strip_prefix(&template)
        .ok()
        .map(Path::to_path_buf))
}

fn check_json(name: &str, text: &str) {
    if let Err(e) = serde_json::from_str::<serde_json::Value>(text) {
        warn!("Rewritten {} is not valid JSON: {}", name, e);
    }
}
