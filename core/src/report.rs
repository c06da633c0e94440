use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_REPORT_TEMPLATE: &str = r"# Forced-Choice Trial Lists

<!-- SECTION:overview start -->
<!-- Describe the stimulus set and the participant or session these lists belong to. -->
<!-- SECTION:overview end -->

## Configuration

<!-- SECTION:configuration start -->
<!-- Populated automatically with the parameters from the latest run. -->
<!-- SECTION:configuration end -->

## Lure Bin Balance

<!-- SECTION:verification start -->
<!-- Populated automatically with trial counts per lure bin and trial type. -->
<!-- SECTION:verification end -->

## Notes

<!-- SECTION:notes start -->
<!-- Free-form notes; sections without markers are never rewritten. -->
<!-- SECTION:notes end -->
";

/// Replacement text for the region between a pair of section markers.
#[derive(Clone, Debug)]
pub struct ReportSection {
    id: String,
    content: String,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    fn markers(&self) -> (String, String) {
        (
            format!("<!-- SECTION:{} start -->", self.id),
            format!("<!-- SECTION:{} end -->", self.id),
        )
    }

    fn splice(&self, document: &str) -> Result<String> {
        let (start, end) = self.markers();
        let (head, rest) = document
            .split_once(&start)
            .ok_or_else(|| anyhow!("missing start marker: {}", start))?;
        let (_, tail) = rest
            .split_once(&end)
            .ok_or_else(|| anyhow!("missing end marker: {}", end))?;

        let body = self.content.trim_matches('\n');
        let mut spliced = String::with_capacity(document.len() + body.len());
        spliced.push_str(head);
        spliced.push_str(&start);
        spliced.push('\n');
        if !body.is_empty() {
            spliced.push_str(body);
            spliced.push('\n');
        }
        spliced.push_str(&end);
        spliced.push_str(tail);
        Ok(spliced)
    }
}

pub fn ensure_report_file(path: &Path, template: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    if !path.exists() {
        fs::write(path, template)
            .with_context(|| format!("failed to write report template to {}", path.display()))?;
    }

    Ok(())
}

/// Rewrite the marked sections of the report at `path`, leaving the rest untouched.
pub fn update_sections(path: &Path, sections: &[ReportSection]) -> Result<()> {
    let mut document = fs::read_to_string(path)
        .with_context(|| format!("failed to read report at {}", path.display()))?;

    for section in sections {
        document = section.splice(&document)?;
    }

    fs::write(path, document)
        .with_context(|| format!("failed to write updated report to {}", path.display()))
}
