use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::jobs::SchedulerTrait;

/// `qsub` prints the job id alone, e.g. "1234567.head-node"
static JOB_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\S*)").unwrap());

pub struct PbsScheduler;

impl SchedulerTrait for PbsScheduler {
  fn submit_binary(&self) -> &'static str {
    "qsub"
  }

  fn parse_job_id(&self, stdout: &str) -> Option<String> {
    JOB_ID_RE
      .captures(stdout.trim())
      .map(|caps| caps[1].to_string())
  }
}
