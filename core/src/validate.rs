//! Cross-document checks on exported token files. Produces a report; never
//! stops on what it finds.

use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    expression::{is_hex_color, is_rgb_function, Expression},
    node::{dot_path, format_number, TokenType, TokenValue},
    store::Document,
};

/// Issues listed per kind in the console report before eliding the rest.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

const SCALE_NAMESPACES: [&str; 3] = ["spacing", "radius", "sizing"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    UnresolvedAlias,
    SelfReference,
    NullValue,
    EmptyValue,
    InvalidColor,
    NegativeValue,
    EmptyFile,
}
impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueKind::UnresolvedAlias => "UNRESOLVED_ALIAS",
            IssueKind::SelfReference => "SELF_REFERENCE",
            IssueKind::NullValue => "NULL_VALUE",
            IssueKind::EmptyValue => "EMPTY_VALUE",
            IssueKind::InvalidColor => "INVALID_COLOR",
            IssueKind::NegativeValue => "NEGATIVE_VALUE",
            IssueKind::EmptyFile => "EMPTY_FILE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}
impl Severity {
    fn marker(self) -> &'static str {
        match self {
            Severity::Error => "🔴",
            Severity::Warning => "🟡",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: String,
    pub value: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub files: usize,
    pub empty_files: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub stats: Stats,
    pub issues: Vec<Issue>,
}

/// Checks every document against every other: references must land on a
/// token somewhere in the set.
pub fn validate(documents: &[Document]) -> Report {
    let mut report = Report {
        stats: Stats {
            files: documents.len(),
            ..Stats::default()
        },
        issues: Vec::new(),
    };

    let known = documents
        .iter()
        .flat_map(|document| document.root.tokens())
        .map(|(path, _)| dot_path(&path))
        .collect::<HashSet<_>>();

    for document in documents {
        if document.is_empty() {
            report.stats.empty_files += 1;
            report.issues.push(Issue {
                kind: IssueKind::EmptyFile,
                path: document.name.clone(),
                value: "{}".to_string(),
                message: "Token file is empty - brand tokens may not be exported".to_string(),
                severity: Severity::Warning,
            });
            continue;
        }
        for (path, token) in document.root.tokens() {
            report.stats.tokens += 1;
            check_value(&dot_path(&path), &token.value, token.type_, &known, &mut report.issues);
        }
    }
    report
}

fn check_value(
    path: &str,
    value: &TokenValue,
    type_: TokenType,
    known: &HashSet<String>,
    issues: &mut Vec<Issue>,
) {
    let issue = |kind, value: String, message: String, severity| Issue {
        kind,
        path: path.to_string(),
        value,
        message,
        severity,
    };
    match value {
        TokenValue::Text(text) => {
            for reference in Expression::parse(text).references() {
                if !known.contains(reference) {
                    issues.push(issue(
                        IssueKind::UnresolvedAlias,
                        text.clone(),
                        format!("Alias references non-existent token: {reference}"),
                        Severity::Error,
                    ));
                } else if reference == path {
                    issues.push(issue(
                        IssueKind::SelfReference,
                        text.clone(),
                        "Token references itself".to_string(),
                        Severity::Error,
                    ));
                }
            }
            if text.is_empty() {
                issues.push(issue(
                    IssueKind::EmptyValue,
                    "(empty string)".to_string(),
                    "Value is empty string".to_string(),
                    Severity::Warning,
                ));
            }
            if type_ == TokenType::Color
                && !is_hex_color(text)
                && !is_rgb_function(text)
                && !text.starts_with('{')
            {
                issues.push(issue(
                    IssueKind::InvalidColor,
                    text.clone(),
                    "Color value not in expected format (#RRGGBB, #RRGGBBAA, or rgba())".to_string(),
                    Severity::Warning,
                ));
            }
        }
        TokenValue::Null => issues.push(issue(
            IssueKind::NullValue,
            "null".to_string(),
            "Value is null - should have a default".to_string(),
            Severity::Warning,
        )),
        TokenValue::Number(n)
            if type_ == TokenType::Number
                && *n < 0.0
                && SCALE_NAMESPACES.iter().any(|ns| path.contains(ns)) =>
        {
            issues.push(issue(
                IssueKind::NegativeValue,
                format_number(*n),
                "Unexpected negative value for spacing/radius/sizing".to_string(),
                Severity::Warning,
            ))
        }
        TokenValue::Number(_) | TokenValue::Bool(_) | TokenValue::Composite(_) => {}
    }
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|issue| issue.severity == Severity::Error)
    }

    /// Issues grouped by kind, in order of first appearance.
    pub fn by_kind(&self) -> IndexMap<IssueKind, Vec<&Issue>> {
        let mut groups: IndexMap<IssueKind, Vec<&Issue>> = IndexMap::new();
        for issue in &self.issues {
            groups.entry(issue.kind).or_default().push(issue);
        }
        groups
    }

    /// Human-readable summary plus the first `preview_limit` issues per kind.
    pub fn render_console(&self, preview_limit: usize) -> String {
        let Stats {
            files,
            empty_files,
            tokens,
        } = self.stats;
        let mut out = format!(
            "Summary\n   Files scanned: {files}\n   Empty files: {empty_files}\n   Total tokens: {tokens}\n   Issues found: {}\n\n",
            self.issues.len()
        );
        if self.issues.is_empty() {
            out.push_str("No issues found!\n");
            return out;
        }
        out.push_str("Issues by type:\n\n");
        for (kind, issues) in self.by_kind() {
            out.push_str(&format!("### {kind} ({})\n", issues.len()));
            for issue in issues.iter().take(preview_limit) {
                out.push_str(&format!(
                    "   {} {}\n      Value: {}\n      {}\n",
                    issue.severity.marker(),
                    issue.path,
                    issue.value,
                    issue.message
                ));
            }
            if issues.len() > preview_limit {
                out.push_str(&format!("   ... and {} more\n", issues.len() - preview_limit));
            }
            out.push('\n');
        }
        out
    }

    /// Markdown tables for pasting into an issue tracker.
    pub fn render_markdown(&self) -> String {
        let of = |kinds: &[IssueKind]| {
            self.issues
                .iter()
                .filter(|issue| kinds.contains(&issue.kind))
                .collect::<Vec<_>>()
        };
        let aliases = of(&[IssueKind::UnresolvedAlias, IssueKind::SelfReference]);
        let empties = of(&[IssueKind::NullValue, IssueKind::EmptyValue]);
        let files = of(&[IssueKind::EmptyFile]);
        let other = of(&[
            IssueKind::InvalidColor,
            IssueKind::NegativeValue,
        ]);

        let mut out = String::new();
        out.push_str(&table("Unresolved Aliases", "Token Path", &aliases));
        out.push_str(&table("Null/Empty Values", "Token Path", &empties));
        out.push_str(&table("Empty Token Files", "File", &files));
        if !other.is_empty() {
            out.push_str(&table("Other Issues", "Token Path", &other));
        }
        out
    }
}

fn table(title: &str, first_column: &str, issues: &[&Issue]) -> String {
    let mut out = format!(
        "### {title}\n| {first_column} | Current Value | Issue | Severity |\n|{}|---------------|-------|----------|\n",
        "-".repeat(first_column.len() + 2)
    );
    if issues.is_empty() {
        out.push_str("| (none) | | | |\n");
    }
    for issue in issues {
        out.push_str(&format!(
            "| {} | `{}` | {} | {} |\n",
            issue.path,
            issue.value,
            issue.message,
            issue.severity.marker()
        ));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn documents() -> Vec<Document> {
        vec![
            Document::parse(
                "Primitives.Default.tokens.json",
                r##"{
                    "system": {
                        "white": {"$type": "color", "$value": "#ffffff"},
                        "muted": {"$type": "color", "$value": "rgba(0, 0, 0, 0.5000)"},
                        "broken": {"$type": "color", "$value": "not-a-color"},
                        "short": {"$type": "color", "$value": "#fff"}
                    }
                }"##,
            )
            .unwrap(),
            Document::parse(
                "Core.default.tokens.json",
                r#"{
                    "uds": {
                        "spacing": {
                            "neg": {"$type": "number", "$value": -4},
                            "1.5": {"$type": "number", "$value": 6}
                        },
                        "offset": {"$type": "number", "$value": -2},
                        "radius": {"none": {"$type": "number", "$value": "{uds.radius.none}"}},
                        "bg": {"$type": "color", "$value": "{system.white}"},
                        "ghost": {"$type": "color", "$value": "{system.ghost}"},
                        "gap": {"$type": "string", "$value": "{uds.spacing.1.5} {uds.spacing.9}"},
                        "unset": {"$type": "color", "$value": null},
                        "blank": {"$type": "string", "$value": ""}
                    }
                }"#,
            )
            .unwrap(),
            Document::parse("Weatherby.Light.tokens.json", "{}").unwrap(),
        ]
    }

    fn kinds_at(report: &Report, path: &str) -> Vec<IssueKind> {
        report
            .issues
            .iter()
            .filter(|issue| issue.path == path)
            .map(|issue| issue.kind)
            .collect()
    }

    #[test]
    fn finds_every_kind() {
        let report = validate(&documents());
        assert_eq!(
            report.stats,
            Stats {
                files: 3,
                empty_files: 1,
                tokens: 13,
            }
        );
        assert_eq!(kinds_at(&report, "system.white"), Vec::<IssueKind>::new());
        assert_eq!(kinds_at(&report, "system.muted"), Vec::<IssueKind>::new());
        assert_eq!(kinds_at(&report, "system.broken"), vec![IssueKind::InvalidColor]);
        assert_eq!(kinds_at(&report, "system.short"), vec![IssueKind::InvalidColor]);
        assert_eq!(kinds_at(&report, "uds.spacing.neg"), vec![IssueKind::NegativeValue]);
        assert_eq!(kinds_at(&report, "uds.spacing.1.5"), Vec::<IssueKind>::new());
        assert_eq!(kinds_at(&report, "uds.offset"), Vec::<IssueKind>::new());
        assert_eq!(kinds_at(&report, "uds.radius.none"), vec![IssueKind::SelfReference]);
        assert_eq!(kinds_at(&report, "uds.bg"), Vec::<IssueKind>::new());
        assert_eq!(kinds_at(&report, "uds.ghost"), vec![IssueKind::UnresolvedAlias]);
        assert_eq!(kinds_at(&report, "uds.gap"), vec![IssueKind::UnresolvedAlias]);
        assert_eq!(kinds_at(&report, "uds.unset"), vec![IssueKind::NullValue]);
        assert_eq!(kinds_at(&report, "uds.blank"), vec![IssueKind::EmptyValue]);
        assert_eq!(
            kinds_at(&report, "Weatherby.Light.tokens.json"),
            vec![IssueKind::EmptyFile]
        );
        assert!(report.has_errors());
    }

    #[test]
    fn invalid_color_is_only_a_warning() {
        let report = validate(&documents());
        let broken = report
            .issues
            .iter()
            .find(|issue| issue.path == "system.broken")
            .unwrap();
        assert_eq!(broken.severity, Severity::Warning);
        assert_eq!(broken.value, "not-a-color");
    }

    #[test]
    fn clean_documents_report_nothing() {
        let docs = vec![Document::parse(
            "a.tokens.json",
            r##"{"a": {"$type": "color", "$value": "#000000"}, "b": {"$value": "{a}"}}"##,
        )
        .unwrap()];
        let report = validate(&docs);
        assert!(report.issues.is_empty());
        assert!(report.render_console(DEFAULT_PREVIEW_LIMIT).ends_with("No issues found!\n"));
    }

    #[test]
    fn metadata_only_file_is_not_empty() {
        let docs = vec![
            Document::parse("Meta.tokens.json", r#"{"$description": "exported later"}"#).unwrap(),
            Document::parse("Blank.tokens.json", "{}").unwrap(),
        ];
        let report = validate(&docs);
        assert_eq!(report.stats.empty_files, 1);
        assert_eq!(
            report.issues.iter().map(|issue| issue.path.as_str()).collect::<Vec<_>>(),
            vec!["Blank.tokens.json"]
        );
    }

    #[test]
    fn console_report_caps_each_kind() {
        let tokens = (0..12)
            .map(|i| format!(r#""t{i}": {{"$value": null}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let docs = vec![Document::parse("n.tokens.json", &format!("{{{tokens}}}")).unwrap()];
        let text = validate(&docs).render_console(10);
        assert!(text.contains("### NULL_VALUE (12)\n"));
        assert!(text.contains("   ... and 2 more\n"));
        assert_eq!(text.matches("Value: null").count(), 10);
    }

    #[test]
    fn markdown_tables() {
        let markdown = validate(&documents()).render_markdown();
        assert!(markdown.starts_with(
            "### Unresolved Aliases\n| Token Path | Current Value | Issue | Severity |\n|------------|---------------|-------|----------|\n"
        ));
        assert!(markdown.contains("| uds.ghost | `{system.ghost}` | Alias references non-existent token: system.ghost | 🔴 |\n"));
        assert!(markdown.contains("### Empty Token Files\n| File | Current Value | Issue | Severity |\n|------|"));
        assert!(markdown.contains("### Other Issues\n"));
    }

    #[test]
    fn json_uses_screaming_kinds() {
        let report = validate(&documents());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["empty_files"], 1);
        assert!(json["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|issue| issue["kind"] == "SELF_REFERENCE" && issue["severity"] == "error"));
    }
}
