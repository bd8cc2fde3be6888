use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::jobs::SchedulerTrait;

/// `sbatch` reports "Submitted batch job <id>" on success
static JOB_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Submitted batch job (\d+)").unwrap());

pub struct SlurmScheduler;

impl SchedulerTrait for SlurmScheduler {
  fn submit_binary(&self) -> &'static str {
    "sbatch"
  }

  fn parse_job_id(&self, stdout: &str) -> Option<String> {
    JOB_ID_RE.captures(stdout).map(|caps| caps[1].to_string())
  }
}
