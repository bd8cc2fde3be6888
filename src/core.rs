pub mod jobs;
pub mod otubatch_config;
pub mod scripts_index;
pub mod templates;


use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;

use crate::core::templates::{JobTemplate, RenderContext, RenderedScript, SchedulerKind};

pub struct Otubatch {
  path: PathBuf,
  config_global: otubatch_config::OtubatchConfig,
  config_local: otubatch_config::OtubatchConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum OtubatchError {
  #[error("Template Error: {0}")]
  TemplateError(#[from] templates::TemplateError),
  #[error("Job Error: {0}")]
  JobError(#[from] jobs::JobError),
  #[error("Config Error: {0}")]
  ConfigError(#[from] otubatch_config::OtubatchConfigError),
  #[error(
    "No scheduler set. Pass --scheduler or set a default using the `set-scheduler` command."
  )]
  NoSchedulerSet,
  #[error("Unknown scheduler '{0}', expected 'slurm' or 'pbs'")]
  UnknownScheduler(String),
}

impl Otubatch {
  pub fn new() -> Result<Self, OtubatchError> {
    let _ = env_logger::try_init();

    let path = otubatch_config::get_otubatch_dir()?;
    let config_global = otubatch_config::get_otubatch_config_global()?;
    let config_local = otubatch_config::get_otubatch_config_local(&path)?;
    Ok(Otubatch {
      path,
      config_global,
      config_local,
    })
  }

  pub fn init(path: &PathBuf) -> Result<(), OtubatchError> {
    otubatch_config::init_otubatch_dir(path)?;
    otubatch_config::init_otubatch_config_global()?;
    Ok(())
  }

  pub fn set_scheduler(
    &mut self,
    name: &str,
    local: bool,
  ) -> Result<SchedulerKind, OtubatchError> {
    let kind = parse_scheduler_kind(name)?;
    if local {
      self.config_local.scheduler = Some(kind.to_string());
      otubatch_config::set_otubatch_config_local(&self.path, &self.config_local)?;
    } else {
      self.config_global.scheduler = Some(kind.to_string());
      otubatch_config::set_otubatch_config_global(&self.config_global)?;
    }
    Ok(kind)
  }

  /// Default scheduler kind, the local config taking precedence over the global one.
  pub fn scheduler_kind(&self) -> Option<SchedulerKind> {
    self
      .config_local
      .scheduler
      .as_deref()
      .or(self.config_global.scheduler.as_deref())
      .and_then(|name| SchedulerKind::from_str(name).ok())
  }

  fn resolve_kind(&self, requested: Option<&str>) -> Result<SchedulerKind, OtubatchError> {
    match requested {
      Some(name) => parse_scheduler_kind(name),
      None => self.scheduler_kind().ok_or(OtubatchError::NoSchedulerSet),
    }
  }

  fn templates_dir(&self) -> Option<&Path> {
    self
      .config_local
      .templates_dir
      .as_deref()
      .or(self.config_global.templates_dir.as_deref())
  }

  /// Resolve the template for a scheduler kind: the configured template
  /// directory when one is set, the built-in registry otherwise.
  pub fn template_for(&self, kind: SchedulerKind) -> Result<JobTemplate, OtubatchError> {
    match self.templates_dir() {
      Some(dir) => {
        debug!("Resolving {} template from {:?}", kind, dir);
        Ok(templates::load_from_dir(dir, kind)?)
      }
      None => Ok(templates::load(kind)?.clone()),
    }
  }

  pub fn render_job(
    &self,
    scheduler: Option<&str>,
    context: &RenderContext,
  ) -> Result<RenderedScript, OtubatchError> {
    let kind = self.resolve_kind(scheduler)?;
    let template = self.template_for(kind)?;
    Ok(templates::render(&template, context)?)
  }

  pub fn submit_jobs(
    &self,
    scheduler: Option<&str>,
    context: &RenderContext,
    num_jobs: u32,
    workdir: &Path,
  ) -> Result<Vec<jobs::SubmittedJob>, OtubatchError> {
    let kind = self.resolve_kind(scheduler)?;
    let template = self.template_for(kind)?;
    Ok(jobs::submit_all(&template, context, num_jobs, workdir)?)
  }

  /// (kind, placeholders) pairs for every resolvable template.
  pub fn list_templates(&self) -> Result<Vec<(SchedulerKind, Vec<String>)>, OtubatchError> {
    let mut listing = Vec::new();
    for kind in [SchedulerKind::Slurm, SchedulerKind::Pbs] {
      let template = self.template_for(kind)?;
      let placeholders: Vec<String> = template.required_placeholders().iter().cloned().collect();
      listing.push((kind, placeholders));
    }
    Ok(listing)
  }
}

fn parse_scheduler_kind(name: &str) -> Result<SchedulerKind, OtubatchError> {
  SchedulerKind::from_str(name).map_err(|_| OtubatchError::UnknownScheduler(name.to_string()))
}
