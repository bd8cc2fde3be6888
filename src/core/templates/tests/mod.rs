use std::collections::BTreeSet;
use std::fs;

use serde_json::json;
use tempfile::TempDir;

use crate::core::templates::scan::scan_placeholders;
use crate::core::templates::{
  JobTemplate, RenderContext, SchedulerKind, TemplateError, load, load_from_dir, render,
};

const KNOWN_PLACEHOLDERS: [&str; 7] = [
  "database_fname",
  "database_path",
  "job_name",
  "job_num",
  "similarity",
  "threads",
  "walltime",
];

/// Context for the reference OTU-picking job: chunk 7, 16 threads, 97% identity
fn full_context() -> RenderContext {
  let mut context = RenderContext::new();
  context
    .set("job_name", "otus")
    .set("job_num", 7)
    .set("walltime", "04:00:00")
    .set("threads", 16)
    .set("database_path", "/db/ref.fna")
    .set("database_fname", "ref.fna")
    .set("similarity", 0.97);
  context
}

// ============================================================================
// Tests for scan_placeholders
// ============================================================================

#[test]
fn test_scan_finds_names_in_order() {
  let names = scan_placeholders("cp {database_path} {dest}/{database_fname}").unwrap();
  assert_eq!(names, vec!["database_path", "dest", "database_fname"]);
}

#[test]
fn test_scan_keeps_duplicates() {
  let names = scan_placeholders("{job_num}.fna -o bpo.{job_num}").unwrap();
  assert_eq!(names, vec!["job_num", "job_num"]);
}

#[test]
fn test_scan_no_placeholders() {
  let names = scan_placeholders("module load qiime").unwrap();
  assert!(names.is_empty());
}

#[test]
fn test_scan_lone_closing_brace_is_literal() {
  let names = scan_placeholders("case $x in esac } {threads}").unwrap();
  assert_eq!(names, vec!["threads"]);
}

#[test]
fn test_scan_unterminated_brace() {
  let result = scan_placeholders("cp {database_path");
  assert!(matches!(result, Err(TemplateError::MalformedTemplate(_))));
}

#[test]
fn test_scan_nested_open_brace() {
  let result = scan_placeholders("cp {data{base_path}");
  assert!(matches!(result, Err(TemplateError::MalformedTemplate(_))));
}

#[test]
fn test_scan_empty_placeholder() {
  let result = scan_placeholders("echo {}");
  assert!(matches!(result, Err(TemplateError::MalformedTemplate(_))));
}

// ============================================================================
// Tests for JobTemplate and the built-in registry
// ============================================================================

#[test]
fn test_new_computes_required_placeholders() {
  let template = JobTemplate::new(SchedulerKind::Slurm, "{a} {b} {a}").unwrap();
  let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
  assert_eq!(template.required_placeholders(), &expected);
}

#[test]
fn test_new_rejects_malformed_text() {
  let result = JobTemplate::new(SchedulerKind::Slurm, "cp {database_path");
  assert!(matches!(result, Err(TemplateError::MalformedTemplate(_))));
}

#[test]
fn test_builtin_templates_require_known_placeholders() {
  for kind in [SchedulerKind::Slurm, SchedulerKind::Pbs] {
    let template = load(kind).unwrap();
    let expected: BTreeSet<String> = KNOWN_PLACEHOLDERS.iter().map(|s| s.to_string()).collect();
    assert_eq!(template.required_placeholders(), &expected);
  }
}

#[test]
fn test_load_is_idempotent() {
  let first = load(SchedulerKind::Pbs).unwrap();
  let second = load(SchedulerKind::Pbs).unwrap();
  assert_eq!(first.raw_text(), second.raw_text());
  assert_eq!(first.required_placeholders(), second.required_placeholders());
}

#[test]
fn test_from_file() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("custom.sbatch");
  fs::write(&path, "#SBATCH --job-name={job_name}\n").unwrap();

  let template = JobTemplate::from_file(SchedulerKind::Slurm, &path).unwrap();
  assert!(template.required_placeholders().contains("job_name"));
}

#[test]
fn test_load_from_dir_picks_matching_extension() {
  let temp_dir = TempDir::new().unwrap();
  fs::write(temp_dir.path().join("custom.sbatch"), "slurm {job_name}").unwrap();
  fs::write(temp_dir.path().join("custom.pbs"), "pbs {job_name}").unwrap();

  let template = load_from_dir(temp_dir.path(), SchedulerKind::Pbs).unwrap();
  assert_eq!(template.scheduler_kind, SchedulerKind::Pbs);
  assert_eq!(template.raw_text(), "pbs {job_name}");
}

#[test]
fn test_load_from_dir_missing_kind() {
  let temp_dir = TempDir::new().unwrap();
  fs::write(temp_dir.path().join("custom.sbatch"), "slurm {job_name}").unwrap();

  let result = load_from_dir(temp_dir.path(), SchedulerKind::Pbs);
  assert!(matches!(result, Err(TemplateError::TemplateNotFound(kind)) if kind == "pbs"));
}

// ============================================================================
// Tests for render
// ============================================================================

#[test]
fn test_render_leaves_no_required_tokens() {
  for kind in [SchedulerKind::Slurm, SchedulerKind::Pbs] {
    let template = load(kind).unwrap();
    let script = render(template, &full_context()).unwrap();
    for name in template.required_placeholders() {
      let token = format!("{{{}}}", name);
      assert!(!script.body().contains(&token));
    }
  }
}

#[test]
fn test_render_missing_placeholder_reports_first_in_scan_order() {
  let template = load(SchedulerKind::Slurm).unwrap();
  let result = render(template, &RenderContext::new());
  assert!(matches!(result, Err(TemplateError::MissingPlaceholder(name)) if name == "job_name"));
}

#[test]
fn test_render_missing_single_value() {
  let template = load(SchedulerKind::Slurm).unwrap();
  // everything supplied except similarity
  let mut context = RenderContext::new();
  context
    .set("job_name", "otus")
    .set("job_num", 7)
    .set("walltime", "04:00:00")
    .set("threads", 16)
    .set("database_path", "/db/ref.fna")
    .set("database_fname", "ref.fna");
  let result = render(template, &context);
  assert!(matches!(result, Err(TemplateError::MissingPlaceholder(name)) if name == "similarity"));
}

#[test]
fn test_render_ignores_extra_keys() {
  let template = load(SchedulerKind::Slurm).unwrap();
  let plain = render(template, &full_context()).unwrap();

  let mut extended = full_context();
  extended.set("unused_key", "unused_value");
  let with_extra = render(template, &extended).unwrap();

  assert_eq!(plain, with_extra);
}

#[test]
fn test_render_no_recursive_substitution() {
  let template = JobTemplate::new(SchedulerKind::Slurm, "echo {a}").unwrap();
  let mut context = RenderContext::new();
  context.set("a", "{b}").set("b", "nope");

  let script = render(&template, &context).unwrap();
  assert_eq!(script.body(), "echo {b}");
}

#[test]
fn test_render_scalar_value_forms() {
  let template = JobTemplate::new(SchedulerKind::Slurm, "{s} {i} {f} {b}").unwrap();
  let mut context = RenderContext::new();
  context
    .set("s", "text")
    .set("i", 42)
    .set("f", 0.5)
    .set("b", true);

  let script = render(&template, &context).unwrap();
  assert_eq!(script.body(), "text 42 0.5 true");
}

#[test]
fn test_render_rejects_non_scalar_value() {
  let template = load(SchedulerKind::Slurm).unwrap();
  let mut context = full_context();
  context.set("threads", json!([8, 16]));

  let result = render(template, &context);
  assert!(matches!(result, Err(TemplateError::InvalidValue(name)) if name == "threads"));
}

#[test]
fn test_render_malformed_raw_text() {
  // Bypass the constructor scan to exercise the render-side check
  let template = JobTemplate {
    scheduler_kind: SchedulerKind::Slurm,
    raw_text: "cp {database_path".to_string(),
    required_placeholders: BTreeSet::new(),
  };
  let result = render(&template, &full_context());
  assert!(matches!(result, Err(TemplateError::MalformedTemplate(_))));
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_render_slurm_reference_job() {
  let template = load(SchedulerKind::Slurm).unwrap();
  let script = render(template, &full_context()).unwrap();

  assert_eq!(script.scheduler_kind, SchedulerKind::Slurm);
  assert_eq!(
    script.body().lines().next().unwrap(),
    "#SBATCH --job-name=otus_7"
  );
  assert!(script.body().contains(
    "/usr/bin/time parallel_pick_otus_blast.py -i 7.fna -r ref.fna -O 16 -s 0.97 -o bpo.7"
  ));
  assert!(script.body().contains("cp /db/ref.fna ."));
}

#[test]
fn test_render_pbs_reference_job() {
  let template = load(SchedulerKind::Pbs).unwrap();
  let script = render(template, &full_context()).unwrap();

  assert_eq!(script.scheduler_kind, SchedulerKind::Pbs);
  assert_eq!(script.body().lines().next().unwrap(), "#PBS -N otus_7");
  assert!(script.body().contains("#PBS -l nodes=1:ppn=16"));
  assert!(script.body().contains("#PBS -l walltime=04:00:00"));
}

// ============================================================================
// Tests for RenderContext::from_json_file
// ============================================================================

#[test]
fn test_context_from_json_file() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("context.json");
  fs::write(&path, r#"{"job_name": "otus", "threads": 16}"#).unwrap();

  let context = RenderContext::from_json_file(&path).unwrap();
  assert!(context.contains("job_name"));
  assert!(context.contains("threads"));
}

#[test]
fn test_context_from_json_file_rejects_non_object() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("context.json");
  fs::write(&path, r#"["job_name"]"#).unwrap();

  let result = RenderContext::from_json_file(&path);
  assert!(matches!(result, Err(TemplateError::ContextNotAnObject)));
}
