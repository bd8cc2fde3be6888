mod pbs;
mod slurm;
mod utils;


use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use thiserror::Error;

use crate::core::templates::{JobTemplate, RenderContext, SchedulerKind, TemplateError, render};

#[derive(Error, Debug)]
pub enum JobError {
  #[error("Launch Error: {0}")]
  LaunchError(String),
  #[error("Template Error: {0}")]
  TemplateError(#[from] TemplateError),
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Job Spawn: {0}")]
  SpawnError(String),
  #[error("No job id found in scheduler output: {0:?}")]
  UnparsedJobId(String),
}

/// One successfully submitted job.
#[derive(Debug)]
pub struct SubmittedJob {
  pub job_num: u32,
  pub job_id: String,
  pub script_path: PathBuf,
}

pub(crate) trait SchedulerTrait {
  /// Name of the scheduler's submission binary
  fn submit_binary(&self) -> &'static str;

  /// Extract the scheduler-assigned job id from the submission stdout
  fn parse_job_id(&self, stdout: &str) -> Option<String>;

  fn submit(&self, script_path: &Path) -> Result<String, JobError> {
    let output = Command::new(self.submit_binary())
      .arg(script_path)
      .output()
      .map_err(|e| JobError::SpawnError(format!("{}: {}", self.submit_binary(), e)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(JobError::LaunchError(format!(
        "{} exited with {}: {}",
        self.submit_binary(),
        output.status,
        stderr.trim()
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    self
      .parse_job_id(&stdout)
      .ok_or_else(|| JobError::UnparsedJobId(stdout.to_string()))
  }
}

fn get_scheduler(kind: SchedulerKind) -> &'static dyn SchedulerTrait {
  match kind {
    SchedulerKind::Slurm => &slurm::SlurmScheduler,
    SchedulerKind::Pbs => &pbs::PbsScheduler,
  }
}

/// Render and submit one job per job number.
///
/// Job numbers run from 1 to `num_jobs`, matching the `<job_num>.fna` input
/// chunks the rendered command consumes. Each job gets `job_num` set in its
/// context (overriding any caller-supplied value), its script written to
/// `<workdir>/pick_otus_<n>.job`, and a line appended to the submission log.
pub fn submit_all(
  template: &JobTemplate,
  base_context: &RenderContext,
  num_jobs: u32,
  workdir: &Path,
) -> Result<Vec<SubmittedJob>, JobError> {
  let scheduler = get_scheduler(template.scheduler_kind);
  let mut submitted = Vec::new();

  for job_num in 1..=num_jobs {
    let mut context = base_context.clone();
    context.set("job_num", job_num);
    let script = render(template, &context)?;

    let script_path = utils::write_job_script(workdir, job_num, script.body())?;
    utils::make_script_executable(&script_path)?;

    let job_id = scheduler.submit(&script_path)?;
    info!("Submitted job {} as {}", job_num, job_id);
    utils::append_submission_log(workdir, &script, job_num, &job_id)?;

    submitted.push(SubmittedJob {
      job_num,
      job_id,
      script_path,
    });
  }

  Ok(submitted)
}
