use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::json;

use crate::core::jobs::JobError;
use crate::core::templates::RenderedScript;

/// File name of the JSON-lines submission log kept in the work directory
pub const SUBMISSION_LOG: &str = "submissions.log";

pub fn get_timestamp_string() -> String {
  Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Write a rendered job script to `<workdir>/pick_otus_<n>.job`
pub fn write_job_script(workdir: &Path, job_num: u32, body: &str) -> Result<PathBuf, JobError> {
  std::fs::create_dir_all(workdir)?;
  let path = workdir.join(format!("pick_otus_{}.job", job_num));
  std::fs::write(&path, body)?;
  Ok(path)
}

/// Make a script file executable (Unix only)
#[cfg(unix)]
pub fn make_script_executable(script_path: &Path) -> Result<(), JobError> {
  use std::os::unix::fs::PermissionsExt;
  let metadata = std::fs::metadata(script_path)?;
  let mut perms = metadata.permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(script_path, perms)?;
  Ok(())
}

#[cfg(not(unix))]
pub fn make_script_executable(_script_path: &Path) -> Result<(), JobError> {
  Ok(())
}

/// Append one submission record to the work directory's log
pub fn append_submission_log(
  workdir: &Path,
  script: &RenderedScript,
  job_num: u32,
  job_id: &str,
) -> Result<(), JobError> {
  let entry = json!({
    "timestamp": get_timestamp_string(),
    "scheduler": script.scheduler_kind.to_string(),
    "job_num": job_num,
    "job_id": job_id,
  });

  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(workdir.join(SUBMISSION_LOG))?;
  writeln!(file, "{}", entry)?;
  Ok(())
}
