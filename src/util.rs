//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Canonical comparison form for learner answers and stored answer keys:
/// leading/trailing whitespace removed, then lower-cased.
/// Keys get this once at drill construction; live input at grading time.
pub fn normalize_answer(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_fills_all_pairs() {
    let out = fill_template("{n} of {total} correct.", &[("n", "2"), ("total", "3")]);
    assert_eq!(out, "2 of 3 correct.");
  }

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_answer(" Paris "), "paris");
    assert_eq!(normalize_answer("WENT"), "went");
    assert_eq!(normalize_answer("  "), "");
  }
}
