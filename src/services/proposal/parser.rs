//! Markdown Proposal Parser
//!
//! Reads the section layout proposal-generator agents are prompted to write:
//!
//! ```text
//! # Proposal: <title>
//! ## Why
//! ## What Changes
//! ## Impact        (Specs affected / Files affected / Breaking changes)
//! ## Tasks         (### Task N: title (category) or checklist bullets)
//! ## Design
//! ```
//!
//! Headings may use levels 1-3 and a few synonyms (`Rationale`, `Changes`).

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::proposal::{ProposalDraft, ProposalImpact, ProposalTask};
use crate::services::proposal::ProposalParser;
use crate::utils::error::AppResult;

const UNTITLED: &str = "Untitled proposal";
const MAX_DERIVED_TITLE_CHARS: usize = 80;

fn heading_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(#{1,4})\s+(.+?)\s*#*\s*$").ok())
        .as_ref()
}

fn task_heading_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^(?:task\s+\d+\s*[:.\-]\s*)?(.+?)(?:\s*\(([^()]+)\))?$").ok()
        })
        .as_ref()
}

fn estimate_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^\**estimated?\**\s*:?\s*\**\s*([0-9]+(?:\.[0-9]+)?)").ok()
        })
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Why,
    Changes,
    Impact,
    Tasks,
    Design,
    Other,
}

impl SectionKind {
    fn from_heading(heading: &str) -> Self {
        let name = heading.trim().trim_end_matches(':').trim().to_lowercase();
        match name.as_str() {
            "why" | "rationale" | "motivation" => SectionKind::Why,
            "what changes" | "changes" | "what changes?" => SectionKind::Changes,
            "impact" => SectionKind::Impact,
            "tasks" | "implementation tasks" => SectionKind::Tasks,
            "design" | "technical design" => SectionKind::Design,
            _ => SectionKind::Other,
        }
    }
}

#[derive(Debug)]
struct Section<'a> {
    kind: SectionKind,
    lines: Vec<&'a str>,
}

/// Default `ProposalParser`
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownProposalParser;

impl MarkdownProposalParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a proposal; `None` when there is neither a rationale nor a change list
    pub fn parse(&self, markdown: &str) -> Option<ProposalDraft> {
        let (title, sections) = split_sections(markdown);

        let why = join_section(&sections, SectionKind::Why);
        let what_changes = section_lines(&sections, SectionKind::Changes)
            .map(|lines| list_items(&lines))
            .unwrap_or_default();

        if why.is_empty() && what_changes.is_empty() {
            debug!("[Proposal] Markdown has no rationale or change list");
            return None;
        }

        let impact = section_lines(&sections, SectionKind::Impact)
            .map(|lines| parse_impact(&lines))
            .unwrap_or_default();
        let tasks = section_lines(&sections, SectionKind::Tasks)
            .map(|lines| parse_tasks(&lines))
            .unwrap_or_default();
        let design = Some(join_section(&sections, SectionKind::Design)).filter(|d| !d.is_empty());

        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| derive_title(&why, &what_changes));

        Some(ProposalDraft {
            title,
            why,
            what_changes,
            impact,
            tasks,
            design,
        })
    }
}

impl ProposalParser for MarkdownProposalParser {
    fn parse_proposal_from_markdown(&self, markdown: &str) -> AppResult<Option<ProposalDraft>> {
        Ok(self.parse(markdown))
    }
}

// ============================================================================
// Sectioning
// ============================================================================

fn split_sections(markdown: &str) -> (Option<String>, Vec<Section<'_>>) {
    let mut title = None;
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut in_code = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
        }

        let heading = if in_code {
            None
        } else {
            heading_regex()
                .and_then(|re| re.captures(line.trim_end()))
                .and_then(|caps| Some((caps.get(1)?.as_str().len(), caps.get(2)?.as_str())))
        };

        if let Some((level, text)) = heading {
            let kind = SectionKind::from_heading(text);
            if kind != SectionKind::Other && level <= 3 {
                sections.push(Section {
                    kind,
                    lines: Vec::new(),
                });
                continue;
            }
            if level == 1 && title.is_none() {
                title = Some(strip_title_prefix(text));
                continue;
            }
            if level <= 2 {
                sections.push(Section {
                    kind: SectionKind::Other,
                    lines: Vec::new(),
                });
                continue;
            }
        }

        if let Some(section) = sections.last_mut() {
            section.lines.push(line);
        }
    }

    (title, sections)
}

fn strip_title_prefix(heading: &str) -> String {
    let trimmed = heading.trim();
    let lower = trimmed.to_lowercase();
    if lower.starts_with("proposal:") {
        trimmed["proposal:".len()..].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lines of every section of a kind, in document order
fn section_lines<'a>(sections: &[Section<'a>], kind: SectionKind) -> Option<Vec<&'a str>> {
    let mut found = false;
    let mut lines = Vec::new();
    for section in sections.iter().filter(|s| s.kind == kind) {
        found = true;
        lines.extend(section.lines.iter().copied());
    }
    found.then_some(lines)
}

fn join_section(sections: &[Section<'_>], kind: SectionKind) -> String {
    section_lines(sections, kind)
        .map(|lines| lines.join("\n").trim().to_string())
        .unwrap_or_default()
}

fn derive_title(why: &str, what_changes: &[String]) -> String {
    let source = why
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .or_else(|| what_changes.first().map(String::as_str))
        .unwrap_or(UNTITLED);
    let first_sentence = source.split(". ").next().unwrap_or(source);
    first_sentence
        .chars()
        .take(MAX_DERIVED_TITLE_CHARS)
        .collect::<String>()
        .trim_end_matches('.')
        .to_string()
}

// ============================================================================
// Lists
// ============================================================================

/// Text of a Markdown list item (`-`, `*`, `+`, `1.`, `1)`), checkbox removed
fn bullet_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        rest
    } else {
        let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        let after = &trimmed[digits..];
        after
            .strip_prefix(". ")
            .or_else(|| after.strip_prefix(") "))?
    };
    Some(strip_checkbox(rest).1.trim())
}

/// Split a `[ ]`/`[x]` checkbox off a list item, returning (checked, text)
fn strip_checkbox(text: &str) -> (bool, &str) {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("[ ]") {
        (false, rest.trim_start())
    } else if let Some(rest) = trimmed
        .strip_prefix("[x]")
        .or_else(|| trimmed.strip_prefix("[X]"))
    {
        (true, rest.trim_start())
    } else {
        (false, trimmed)
    }
}

/// List items of a section, or its non-empty lines when it has no list
fn list_items(lines: &[&str]) -> Vec<String> {
    let bullets: Vec<String> = lines
        .iter()
        .filter_map(|l| bullet_text(l))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if !bullets.is_empty() {
        return bullets;
    }
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Impact
// ============================================================================

fn parse_impact(lines: &[&str]) -> ProposalImpact {
    let mut impact = ProposalImpact::default();
    for line in lines {
        let text = bullet_text(line).unwrap_or(line.trim());
        let plain = text.replace('*', "");
        let Some((key, value)) = plain.split_once(':') else {
            continue;
        };
        match key.trim().to_lowercase().as_str() {
            "specs affected" | "specs" | "affected specs" => {
                impact.specs.extend(split_list(value));
            }
            "files affected" | "files" | "affected files" => {
                impact.files.extend(split_list(value));
            }
            "breaking changes" | "breaking change" | "breaking" => {
                let answer = value.trim().to_lowercase();
                impact.breaking_changes = answer.starts_with("yes") || answer.starts_with("true");
            }
            _ => {}
        }
    }
    impact
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().trim_matches('`').trim())
        .filter(|item| {
            !item.is_empty() && !matches!(item.to_lowercase().as_str(), "none" | "n/a" | "-")
        })
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tasks
// ============================================================================

fn parse_tasks(lines: &[&str]) -> Vec<ProposalTask> {
    let mut tasks: Vec<ProposalTask> = Vec::new();
    let mut heading_style = false;

    for line in lines {
        let trimmed = line.trim();
        let heading = heading_regex()
            .and_then(|re| re.captures(trimmed))
            .and_then(|caps| caps.get(2).map(|m| m.as_str()));

        if let Some(text) = heading {
            heading_style = true;
            let index = tasks.len() + 1;
            tasks.push(new_task(index, text, false));
            continue;
        }

        if heading_style {
            let Some(task) = tasks.last_mut() else {
                continue;
            };
            if let Some(hours) = parse_estimate(trimmed) {
                task.estimated_hours = hours;
            } else if !trimmed.is_empty() {
                if !task.description.is_empty() {
                    task.description.push('\n');
                }
                task.description.push_str(trimmed);
            }
            continue;
        }

        if let Some(item) = bullet_item_with_state(trimmed) {
            let index = tasks.len() + 1;
            tasks.push(new_task(index, item.1, item.0));
        }
    }
    tasks
}

fn bullet_item_with_state(line: &str) -> Option<(bool, &str)> {
    let rest = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
        .or_else(|| {
            bullet_text(line)?;
            line.split_once(' ').map(|(_, rest)| rest)
        })?;
    let (done, text) = strip_checkbox(rest);
    let text = text.trim();
    (!text.is_empty()).then_some((done, text))
}

fn new_task(index: usize, text: &str, done: bool) -> ProposalTask {
    let (title, category) = task_heading_regex()
        .and_then(|re| re.captures(text))
        .map(|caps| {
            (
                caps.get(1).map(|m| m.as_str().trim().to_string()),
                caps.get(2).map(|m| m.as_str().trim().to_string()),
            )
        })
        .unwrap_or((None, None));

    ProposalTask {
        id: format!("task-{index}"),
        title: title.unwrap_or_else(|| text.trim().to_string()),
        description: String::new(),
        category: category.unwrap_or_default(),
        estimated_hours: 0.0,
        done,
    }
}

fn parse_estimate(line: &str) -> Option<f64> {
    let caps = estimate_regex()?.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "# Proposal: Add dark mode

## Why

Users work at night and the bright theme strains their eyes.

## What Changes

- Add a theme toggle to settings
- Persist the selected theme

## Impact

- **Specs affected**: ui-theme, settings
- **Files affected**: `src/theme.ts`, `src/settings.tsx`
- **Breaking changes**: No

## Tasks

### Task 1: Theme tokens (frontend)

Define dark color tokens.

**Estimated**: 2 hours

### Task 2: Toggle (frontend)

**Estimated**: 1.5 hours

## Design

CSS variables switched on the root element.
";

    #[test]
    fn test_parse_full_proposal() {
        let draft = MarkdownProposalParser::new().parse(FULL).unwrap();
        assert_eq!(draft.title, "Add dark mode");
        assert!(draft.why.starts_with("Users work at night"));
        assert_eq!(
            draft.what_changes,
            vec!["Add a theme toggle to settings", "Persist the selected theme"]
        );
        assert_eq!(draft.impact.specs, vec!["ui-theme", "settings"]);
        assert_eq!(draft.impact.files, vec!["src/theme.ts", "src/settings.tsx"]);
        assert!(!draft.impact.breaking_changes);
        assert_eq!(draft.tasks.len(), 2);
        assert_eq!(draft.tasks[0].title, "Theme tokens");
        assert_eq!(draft.tasks[0].category, "frontend");
        assert_eq!(draft.tasks[0].description, "Define dark color tokens.");
        assert_eq!(draft.tasks[0].estimated_hours, 2.0);
        assert_eq!(draft.tasks[1].estimated_hours, 1.5);
        assert_eq!(
            draft.design.as_deref(),
            Some("CSS variables switched on the root element.")
        );
    }

    #[test]
    fn test_checklist_tasks_and_synonyms() {
        let markdown = "### Rationale\nSlow builds.\n\n### Changes\n1. Cache deps\n2. Split crates\n\n## Tasks\n- [x] Add cache step\n- [ ] Measure (ci)\n";
        let draft = MarkdownProposalParser::new().parse(markdown).unwrap();
        assert_eq!(draft.why, "Slow builds.");
        assert_eq!(draft.what_changes, vec!["Cache deps", "Split crates"]);
        assert_eq!(draft.tasks.len(), 2);
        assert!(draft.tasks[0].done);
        assert_eq!(draft.tasks[1].title, "Measure");
        assert_eq!(draft.tasks[1].category, "ci");
        // no title heading: derived from the rationale
        assert_eq!(draft.title, "Slow builds");
    }

    #[test]
    fn test_breaking_changes_yes() {
        let markdown = "## Why\nNew API.\n\n## Impact\n- Breaking changes: Yes, clients must update\n- Specs affected: none\n";
        let draft = MarkdownProposalParser::new().parse(markdown).unwrap();
        assert!(draft.impact.breaking_changes);
        assert!(draft.impact.specs.is_empty());
    }

    #[test]
    fn test_no_rationale_or_changes_is_none() {
        let parser = MarkdownProposalParser::new();
        assert!(parser.parse("Just some chat reply without sections.").is_none());
        assert!(parser.parse("## Impact\n- Files affected: a.rs\n").is_none());
    }

    #[test]
    fn test_headings_inside_code_blocks_are_ignored() {
        let markdown = "## Why\nExample below.\n```md\n## Impact\n```\n";
        let draft = MarkdownProposalParser::new().parse(markdown).unwrap();
        assert!(draft.why.contains("## Impact"));
        assert!(draft.impact.files.is_empty());
    }

    #[test]
    fn test_trait_wraps_parse() {
        let parser = MarkdownProposalParser::new();
        let parsed = parser.parse_proposal_from_markdown(FULL).unwrap();
        assert!(parsed.is_some());
    }
}
