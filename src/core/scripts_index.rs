
/// included documentation index of the surrounding script toolkit
static AVAILABLE_SCRIPTS: &str = include_str!(concat!(
  env!("CARGO_MANIFEST_DIR"),
  "/data/available_scripts.txt"
));

/// Parse a documentation index: one script name per line, `#` comments and
/// blank lines skipped, order preserved.
pub fn parse_index(text: &str) -> Vec<String> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(|line| line.to_string())
    .collect()
}

/// Names of the toolkit scripts that have documentation pages.
pub fn available_scripts() -> Vec<String> {
  parse_index(AVAILABLE_SCRIPTS)
}
