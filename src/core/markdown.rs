//! Line-oriented markdown heading scanner.
//!
//! The scanner makes one pass over a document and records every ATX heading
//! (`#` .. `######`) as a [`HeadingMarker`]. Callers slice content between
//! adjacent markers instead of searching forward for "the next heading",
//! which keeps section boundaries in a single place.

/// One heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarker {
    /// Number of leading `#` characters.
    pub level: usize,
    /// Heading text with the hashes and surrounding whitespace removed.
    pub title: String,
    /// Zero-based index of the heading line.
    pub line: usize,
}

/// Scanned document: its lines plus the heading markers found in them.
#[derive(Debug, Clone)]
pub struct ScannedDoc<'a> {
    pub lines: Vec<&'a str>,
    pub headings: Vec<HeadingMarker>,
    /// `fenced[i]` is true when line `i` is a fence delimiter or inside one.
    pub fenced: Vec<bool>,
}

/// Parse a single line as an ATX heading. Returns `(level, title)`.
pub fn heading_of(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    // Up to three spaces of indentation are still a heading.
    let indent = trimmed.len() - trimmed.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let body = &trimmed[indent..];
    let level = body.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &body[level..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    Some((level, title))
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Scan `text` once and collect every heading outside fenced code blocks.
pub fn scan(text: &str) -> ScannedDoc<'_> {
    let lines: Vec<&str> = text.lines().collect();
    let mut headings = Vec::new();
    let mut fenced = vec![false; lines.len()];
    let mut in_fence = false;

    for (idx, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            fenced[idx] = true;
            continue;
        }
        if in_fence {
            fenced[idx] = true;
            continue;
        }
        if let Some((level, title)) = heading_of(line) {
            headings.push(HeadingMarker {
                level,
                title: title.to_string(),
                line: idx,
            });
        }
    }

    ScannedDoc {
        lines,
        headings,
        fenced,
    }
}

impl<'a> ScannedDoc<'a> {
    /// Lines strictly between `start` (exclusive) and `end` (exclusive),
    /// joined and trimmed of blank edges and trailing `---` separators.
    pub fn body_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        if start + 1 >= end {
            return String::new();
        }
        let body = &self.lines[start + 1..end];
        let last = body.iter().rposition(|l| {
            let t = l.trim();
            !t.is_empty() && !is_rule_separator(t)
        });
        let Some(last) = last else {
            return String::new();
        };
        let first = body[..=last]
            .iter()
            .position(|l| !l.trim().is_empty())
            .unwrap_or(last);
        body[first..=last].join("\n")
    }

    /// Body of the section opened by the first heading whose title matches
    /// `name` (case-insensitive), running to the next heading of the same or
    /// higher level.
    pub fn section(&self, name: &str) -> Option<String> {
        let pos = self
            .headings
            .iter()
            .position(|h| h.title.eq_ignore_ascii_case(name))?;
        let opener = &self.headings[pos];
        let end = self.headings[pos + 1..]
            .iter()
            .find(|h| h.level <= opener.level)
            .map(|h| h.line)
            .unwrap_or(self.lines.len());
        Some(self.body_between(opener.line, end))
    }

    pub fn first_title(&self) -> Option<&str> {
        self.headings
            .iter()
            .find(|h| h.level == 1)
            .map(|h| h.title.as_str())
    }
}

fn is_rule_separator(t: &str) -> bool {
    t.len() >= 3 && (t.chars().all(|c| c == '-') || t.chars().all(|c| c == '*'))
}

/// Top-level bullet items (`-`, `*`, `+`, `1.`) of a markdown block.
pub fn bullet_items(block: &str) -> Vec<String> {
    let mut items = Vec::new();
    for line in block.lines() {
        if line.starts_with("  ") || line.starts_with('\t') {
            continue;
        }
        let t = line.trim();
        let item = if let Some(rest) = t
            .strip_prefix("- ")
            .or_else(|| t.strip_prefix("* "))
            .or_else(|| t.strip_prefix("+ "))
        {
            Some(rest)
        } else {
            let digits = t.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 {
                t[digits..].strip_prefix(". ")
            } else {
                None
            }
        };
        if let Some(item) = item {
            let item = item.trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    items
}
