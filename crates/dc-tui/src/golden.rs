//! Golden snapshot management for terminal render tests.
//!
//! Snapshots live under `tests/__goldens__` next to the crate. Run with
//! `UPDATE_GOLDENS=1` to rewrite them from the current render output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use similar::{ChangeTag, TextDiff};

pub struct GoldenManager {
    base_dir: PathBuf,
    update_mode: bool,
}

impl GoldenManager {
    pub fn new(group: &str) -> Self {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("__goldens__")
            .join(group);
        let update_mode = std::env::var("UPDATE_GOLDENS").is_ok();
        Self {
            base_dir,
            update_mode,
        }
    }

    pub fn with_base_dir(base_dir: PathBuf, update_mode: bool) -> Self {
        Self {
            base_dir,
            update_mode,
        }
    }

    fn golden_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.txt"))
    }

    /// Compare the rendered screen against the stored golden, or rewrite the
    /// golden when update mode is on.
    pub fn compare_or_update(&self, name: &str, actual: &str) -> Result<()> {
        let normalized = normalize_golden(actual);
        let path = self.golden_path(name);

        if self.update_mode {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(&path, &normalized)
                .with_context(|| format!("writing golden {}", path.display()))?;
            return Ok(());
        }

        let expected = fs::read_to_string(&path).with_context(|| {
            format!(
                "missing golden {} (run with UPDATE_GOLDENS=1 to create it)",
                path.display()
            )
        })?;

        if expected == normalized {
            return Ok(());
        }

        let diff = TextDiff::from_lines(&expected, &normalized);
        let mut report = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            report.push_str(sign);
            report.push_str(change.value());
        }
        bail!("golden mismatch for '{name}':\n{report}");
    }
}

/// Strip render noise that should never fail a comparison: trailing spaces
/// on each line and wall-clock message timestamps.
pub fn normalize_golden(content: &str) -> String {
    let clock = clock_pattern();
    let mut out = String::new();
    for line in content.lines() {
        let masked = clock.replace_all(line.trim_end(), "--:--:--");
        out.push_str(&masked);
        out.push('\n');
    }
    out
}

fn clock_pattern() -> Regex {
    Regex::new(r"\b\d{2}:\d{2}:\d{2}\b").expect("clock pattern")
}
