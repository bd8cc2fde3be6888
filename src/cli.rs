mod utils;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::core::{self, Otubatch};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a .otubatch directory in the current directory
  Init {},
  /// Set the default scheduler kind (slurm or pbs)
  SetScheduler {
    name: String,
    /// Store in the local .otubatch config instead of the global one
    #[arg(long)]
    local: bool,
  },
  /// List job templates and the placeholders they require
  Templates {},
  /// List the documented toolkit scripts
  Scripts {},
  /// Render a job script to stdout or a file
  Render {
    #[arg(long)]
    scheduler: Option<String>,
    /// JSON file holding placeholder values
    #[arg(long)]
    context: Option<String>,
    /// Extra placeholder value (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,
    #[arg(long)]
    output: Option<String>,
  },
  /// Render and submit one job per job number
  Submit {
    #[arg(long)]
    scheduler: Option<String>,
    /// JSON file holding placeholder values
    #[arg(long)]
    context: Option<String>,
    /// Extra placeholder value (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,
    /// Number of jobs to submit (job_num runs from 1 to N)
    #[arg(long, default_value_t = 1)]
    jobs: u32,
    /// Directory for job scripts and the submission log
    #[arg(long, default_value = ".")]
    workdir: String,
  },
}

pub fn main() {
  let cli = Cli::parse();

  match &cli.command {
    Some(Commands::Init {}) => {
      let path = std::env::current_dir().expect("Failed to get current directory");
      Otubatch::init(&path).expect("Failed to initialize otubatch directory");
      println!("✅ Otubatch initialized successfully!");
    }
    Some(Commands::SetScheduler { name, local }) => {
      let mut otubatch = core::Otubatch::new().expect("Failed to initialize Otubatch");
      let kind = otubatch
        .set_scheduler(name, *local)
        .expect("Failed to set scheduler in otubatch configuration");
      println!("✅ Default scheduler set to '{}' successfully!", kind);
    }
    Some(Commands::Templates {}) => {
      let otubatch = core::Otubatch::new().expect("Failed to initialize Otubatch");
      let listing = otubatch.list_templates().expect("Failed to list templates");
      for (kind, placeholders) in listing {
        println!("{}: {}", kind, placeholders.join(", "));
      }
    }
    Some(Commands::Scripts {}) => {
      for name in core::scripts_index::available_scripts() {
        println!("{}", name);
      }
    }
    Some(Commands::Render {
      scheduler,
      context,
      sets,
      output,
    }) => {
      let otubatch = core::Otubatch::new().expect("Failed to initialize Otubatch");
      let context =
        utils::build_context(context.as_deref(), sets).expect("Failed to build render context");
      let script = otubatch
        .render_job(scheduler.as_deref(), &context)
        .expect("Failed to render job script");
      match output {
        Some(path) => {
          std::fs::write(path, script.body()).expect("Failed to write rendered script");
          println!("✅ Rendered {} script to '{}'", script.scheduler_kind, path);
        }
        None => print!("{}", script.body()),
      }
    }
    Some(Commands::Submit {
      scheduler,
      context,
      sets,
      jobs,
      workdir,
    }) => {
      let otubatch = core::Otubatch::new().expect("Failed to initialize Otubatch");
      let context =
        utils::build_context(context.as_deref(), sets).expect("Failed to build render context");
      let submitted = otubatch
        .submit_jobs(scheduler.as_deref(), &context, *jobs, Path::new(workdir))
        .expect("Failed to submit jobs");
      for job in &submitted {
        println!("✅ Job {} submitted as '{}'", job.job_num, job.job_id);
      }
    }
    None => {}
  }
}
