//! Field Cleaner: strips page labels and layout whitespace from a raw table cell.
//!
//! Pure text transforms only. Nothing here interprets the content of a cell.

/// Cleans one kind of cell, e.g. the performer cell labelled `Performer:`.
#[derive(Debug, Clone)]
pub struct FieldCleaner {
    label: String,
    join: String,
}

impl FieldCleaner {
    /// `label` is the field name printed before the value (without the colon); `join` is
    /// what separate lines of the cell are joined with.
    pub fn new(label: impl Into<String>, join: impl Into<String>) -> Self {
        Self {
            label: format!("{}:", label.into()),
            join: join.into(),
        }
    }

    /// Returns the cleaned cell, or an empty string when nothing usable is left.
    ///
    /// Running this on its own output returns the same string.
    pub fn clean(&self, raw: &str) -> String {
        let text = strip_label(raw, &self.label);
        text.lines()
            .map(scrub_line)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(&self.join)
    }
}

/// Removes `label` if it is the first non-whitespace text of the cell.
pub fn strip_label<'a>(raw: &'a str, label: &str) -> &'a str {
    let trimmed = raw.trim_start();
    match trimmed.strip_prefix(label) {
        Some(rest) => rest.trim_start(),
        None => trimmed,
    }
}

/// Tabs become single spaces, other control characters are dropped, ends are trimmed.
fn scrub_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tab_run = false;
    for c in line.chars() {
        if c == '\t' {
            if !in_tab_run {
                out.push(' ');
            }
            in_tab_run = true;
            continue;
        }
        in_tab_run = false;
        if !c.is_control() {
            out.push(c);
        }
    }
    out.trim().to_string()
}
