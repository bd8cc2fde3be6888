mod render;
mod scan;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use strum::{Display, EnumString};
use thiserror::Error;
use walkdir::WalkDir;

pub use render::{RenderContext, RenderedScript, render};
use scan::scan_placeholders;

#[derive(Error, Debug)]
pub enum TemplateError {
  #[error("No template registered for scheduler '{0}'")]
  TemplateNotFound(String),
  #[error("No value supplied for placeholder '{0}'")]
  MissingPlaceholder(String),
  #[error("Malformed template: {0}")]
  MalformedTemplate(String),
  #[error("Value for '{0}' is not a scalar")]
  InvalidValue(String),
  #[error("Context file must hold a single JSON object")]
  ContextNotAnObject,
  #[error("JSON Error: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SchedulerKind {
  Slurm,
  Pbs,
}

impl SchedulerKind {
  /// File extension of template files for this scheduler
  pub fn template_extension(&self) -> &'static str {
    match self {
      SchedulerKind::Slurm => "sbatch",
      SchedulerKind::Pbs => "pbs",
    }
  }
}

/// An unrendered job template together with the placeholder names it requires.
///
/// `required_placeholders` is exactly the set of distinct `{identifier}`
/// tokens in `raw_text`; it is computed once on construction and the template
/// is read-only afterwards.
#[derive(Debug, Clone)]
pub struct JobTemplate {
  pub scheduler_kind: SchedulerKind,
  raw_text: String,
  required_placeholders: BTreeSet<String>,
}

impl JobTemplate {
  pub fn new(scheduler_kind: SchedulerKind, raw_text: &str) -> Result<Self, TemplateError> {
    let names = scan_placeholders(raw_text)?;
    let required_placeholders: BTreeSet<String> =
      names.into_iter().map(|name| name.to_string()).collect();
    Ok(JobTemplate {
      scheduler_kind,
      raw_text: raw_text.to_string(),
      required_placeholders,
    })
  }

  pub fn from_file(scheduler_kind: SchedulerKind, path: &Path) -> Result<Self, TemplateError> {
    debug!("Loading {} template from {:?}", scheduler_kind, path);
    let text = std::fs::read_to_string(path)?;
    Self::new(scheduler_kind, &text)
  }

  pub fn raw_text(&self) -> &str {
    &self.raw_text
  }

  pub fn required_placeholders(&self) -> &BTreeSet<String> {
    &self.required_placeholders
  }
}

/// included job templates, one per scheduler
static SLURM_TEMPLATE: &str = include_str!(concat!(
  env!("CARGO_MANIFEST_DIR"),
  "/data/templates/pick_otus.sbatch"
));
static PBS_TEMPLATE: &str = include_str!(concat!(
  env!("CARGO_MANIFEST_DIR"),
  "/data/templates/pick_otus.pbs"
));

/// Process-wide registry of the built-in templates, scanned once on first
/// use and read-only for the rest of the process lifetime.
static REGISTRY: Lazy<HashMap<SchedulerKind, JobTemplate>> = Lazy::new(|| {
  let mut registry = HashMap::new();
  registry.insert(
    SchedulerKind::Slurm,
    JobTemplate::new(SchedulerKind::Slurm, SLURM_TEMPLATE).expect("Built-in slurm template"),
  );
  registry.insert(
    SchedulerKind::Pbs,
    JobTemplate::new(SchedulerKind::Pbs, PBS_TEMPLATE).expect("Built-in pbs template"),
  );
  registry
});

/// Look up the built-in template for a scheduler kind.
pub fn load(kind: SchedulerKind) -> Result<&'static JobTemplate, TemplateError> {
  REGISTRY
    .get(&kind)
    .ok_or_else(|| TemplateError::TemplateNotFound(kind.to_string()))
}

/// Load the template for `kind` from a user template directory.
///
/// The directory is walked for files carrying the scheduler's extension
/// (`.sbatch` for Slurm, `.pbs` for PBS); the first match is scanned and
/// returned. A directory without a matching file fails with
/// `TemplateNotFound`.
pub fn load_from_dir(dir: &Path, kind: SchedulerKind) -> Result<JobTemplate, TemplateError> {
  for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
    if !entry.file_type().is_file() {
      continue;
    }
    let matches = entry
      .path()
      .extension()
      .map(|ext| ext == kind.template_extension())
      .unwrap_or(false);
    if matches {
      return JobTemplate::from_file(kind, entry.path());
    }
  }
  Err(TemplateError::TemplateNotFound(kind.to_string()))
}
