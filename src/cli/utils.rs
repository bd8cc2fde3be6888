use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::templates::RenderContext;

/// Assemble a render context from an optional JSON file plus NAME=VALUE pairs.
///
/// Pairs layer on top of the file; values that parse as JSON numbers or
/// booleans keep their type, anything else is taken as a string.
pub fn build_context(context_file: Option<&str>, sets: &[String]) -> Result<RenderContext> {
  let mut context = match context_file {
    Some(path) => RenderContext::from_json_file(Path::new(path))
      .with_context(|| format!("Failed to read context file '{}'", path))?,
    None => RenderContext::new(),
  };

  for pair in sets {
    let (name, value) = pair
      .split_once('=')
      .with_context(|| format!("Invalid --set '{}', expected NAME=VALUE", pair))?;
    context.set(name, parse_scalar(value));
  }

  Ok(context)
}

fn parse_scalar(raw: &str) -> Value {
  match serde_json::from_str::<Value>(raw) {
    Ok(value) if value.is_number() || value.is_boolean() => value,
    _ => Value::String(raw.to_string()),
  }
}
