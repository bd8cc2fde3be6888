use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::{JobTemplate, SchedulerKind, TemplateError};

/// Caller-supplied values used to fill a template's placeholders for one job.
///
/// Values are scalar JSON values; numbers and booleans substitute in their
/// display form. Insertion order is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
  values: HashMap<String, Value>,
}

impl RenderContext {
  pub fn new() -> Self {
    RenderContext::default()
  }

  pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) -> &mut Self {
    self.values.insert(name.to_string(), value.into());
    self
  }

  pub fn contains(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  /// Read a context from a JSON file holding a single flat object.
  pub fn from_json_file(path: &Path) -> Result<Self, TemplateError> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    let Value::Object(map) = value else {
      return Err(TemplateError::ContextNotAnObject);
    };
    Ok(RenderContext {
      values: map.into_iter().collect(),
    })
  }

  fn lookup(&self, name: &str) -> Result<String, TemplateError> {
    let value = self
      .values
      .get(name)
      .ok_or_else(|| TemplateError::MissingPlaceholder(name.to_string()))?;
    scalar_to_string(value).ok_or_else(|| TemplateError::InvalidValue(name.to_string()))
  }
}

fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// A fully substituted job script, ready for the submission mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedScript {
  pub scheduler_kind: SchedulerKind,
  body: String,
}

impl RenderedScript {
  pub fn body(&self) -> &str {
    &self.body
  }
}

/// Substitute every placeholder in `template` with its context value.
///
/// Substitution is a single left-to-right pass: each `{identifier}` is
/// replaced by the string form of its value, and substituted text is never
/// re-scanned. Context keys the template does not reference are ignored.
/// Fails on the first placeholder without a value, returning no partial
/// text.
pub fn render(
  template: &JobTemplate,
  context: &RenderContext,
) -> Result<RenderedScript, TemplateError> {
  let text = template.raw_text();
  let mut body = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(pos) = rest.find('{') {
    body.push_str(&rest[..pos]);
    let open = text.len() - rest.len() + pos;
    let after = &rest[pos + 1..];
    let end = after.find(['{', '}']).ok_or_else(|| {
      TemplateError::MalformedTemplate(format!("unterminated '{{' at byte {}", open))
    })?;
    if after.as_bytes()[end] == b'{' {
      return Err(TemplateError::MalformedTemplate(format!(
        "unterminated '{{' at byte {}",
        open
      )));
    }
    if end == 0 {
      return Err(TemplateError::MalformedTemplate(format!(
        "empty placeholder at byte {}",
        open
      )));
    }
    let name = &after[..end];
    body.push_str(&context.lookup(name)?);
    rest = &after[end + 1..];
  }
  body.push_str(rest);

  Ok(RenderedScript {
    scheduler_kind: template.scheduler_kind,
    body,
  })
}
