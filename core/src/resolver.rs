//! Alias resolution: turns `{dot.path}` references into literals.

use std::fmt;

use indexmap::IndexSet;
use tracing::debug;

use crate::{
    expression::{parse_leading_number, Expression, Segment},
    node::{dot_path, Group, Literal, Node, TokenValue},
};

/// Substitution passes before a value is given up on as cyclic.
pub const MAX_DEPTH: usize = 10;

/// Roots retried, in order, when a reference does not resolve as written.
/// Upstream exports are inconsistent about including the root namespace.
pub const FALLBACK_PREFIXES: [&str; 3] = ["uds", "system", "design-system"];

/// Scale step names that stand for zero.
const ZERO_SENTINELS: [&str; 1] = ["none"];

/// What to do with a reference that points nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Leave the `{...}` text in place.
    Keep,
    /// Derive a literal from the reference's final segment.
    DeriveFromPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Unresolved,
    NamespaceTarget,
    NonScalarTarget,
    DepthExceeded,
    NonScalar,
}

/// A recoverable problem met while resolving or flattening one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: String,
    pub reference: String,
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostic {
            kind,
            path,
            reference,
        } = self;
        match kind {
            DiagnosticKind::Unresolved => {
                write!(f, "{path}: could not resolve reference {{{reference}}}")
            }
            DiagnosticKind::NamespaceTarget => {
                write!(f, "{path}: reference {{{reference}}} points at a namespace, not a token")
            }
            DiagnosticKind::NonScalarTarget => {
                write!(f, "{path}: reference {{{reference}}} points at a token with no scalar value")
            }
            DiagnosticKind::DepthExceeded => write!(
                f,
                "{path}: gave up on `{reference}` after {MAX_DEPTH} substitution passes"
            ),
            DiagnosticKind::NonScalar => write!(f, "{path}: value is not a scalar, skipped"),
        }
    }
}

/// The token being resolved: its dot path and its own key, which may itself
/// contain dots.
struct Current<'a> {
    path: String,
    key: &'a str,
}

/// Diagnostics in the order first met, each reported once.
pub type Diagnostics = IndexSet<Diagnostic>;

fn push(diagnostics: &mut Diagnostics, diagnostic: Diagnostic) {
    if !diagnostics.contains(&diagnostic) {
        debug!(%diagnostic, "token diagnostic");
        diagnostics.insert(diagnostic);
    }
}

enum Step {
    /// Keep substituting from this literal.
    Continue(Literal),
    /// Final answer; the reference could not be followed.
    Stop(Literal),
}

/// Resolves references against one immutable merged tree.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    tree: &'t Group,
    policy: UnresolvedPolicy,
}

impl<'t> Resolver<'t> {
    pub fn new(tree: &'t Group, policy: UnresolvedPolicy) -> Self {
        Resolver { tree, policy }
    }
    pub fn tree(&self) -> &'t Group {
        self.tree
    }
    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    /// Resolves a token value. `null` and composite values have no literal.
    pub fn resolve_value(
        &self,
        value: &TokenValue,
        token_path: &[&str],
        diagnostics: &mut Diagnostics,
    ) -> Option<Literal> {
        value
            .as_literal()
            .map(|literal| self.resolve(literal, token_path, diagnostics))
    }

    /// Substitutes every reference in `literal`, pass after pass, until none
    /// remain or [`MAX_DEPTH`] passes have run. `token_path` holds the keys of
    /// the token being resolved, used to spot self-references.
    pub fn resolve(
        &self,
        literal: Literal,
        token_path: &[&str],
        diagnostics: &mut Diagnostics,
    ) -> Literal {
        let origin = Current {
            path: dot_path(token_path),
            key: token_path.last().copied().unwrap_or_default(),
        };
        let mut current = literal;
        for _ in 0..MAX_DEPTH {
            let Literal::Text(text) = &current else {
                return current;
            };
            let expr = Expression::parse(text);
            if !expr.has_references() {
                return current;
            }
            let next = match expr.single_reference() {
                Some(reference) => match self.follow(reference, &origin, diagnostics) {
                    Step::Continue(next) => next,
                    Step::Stop(last) => return last,
                },
                None => self.substitute(&expr, &origin, diagnostics),
            };
            if next == current {
                return current;
            }
            current = next;
        }
        if let Literal::Text(text) = &current {
            if Expression::parse(text).has_references() {
                push(
                    diagnostics,
                    Diagnostic {
                        kind: DiagnosticKind::DepthExceeded,
                        path: origin.path.clone(),
                        reference: text.clone(),
                    },
                );
            }
        }
        current
    }

    fn substitute(
        &self,
        expr: &Expression,
        origin: &Current<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Literal {
        let mut out = String::new();
        for segment in &expr.0 {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Ref(reference) => match self.follow(reference, origin, diagnostics) {
                    Step::Continue(literal) | Step::Stop(literal) => {
                        out.push_str(&literal.to_string())
                    }
                },
            }
        }
        Literal::Text(out)
    }

    /// One hop: the literal a single reference stands for.
    fn follow(&self, reference: &str, origin: &Current<'_>, diagnostics: &mut Diagnostics) -> Step {
        let Some((resolved_path, node)) = self.lookup(reference) else {
            return self.unresolved(DiagnosticKind::Unresolved, reference, origin, diagnostics);
        };
        if resolved_path == origin.path {
            return Step::Continue(derive_from_key(origin.key));
        }
        match node {
            Node::Token(token) => match token.value.as_literal() {
                Some(literal) => Step::Continue(literal),
                None => self.unresolved(
                    DiagnosticKind::NonScalarTarget,
                    reference,
                    origin,
                    diagnostics,
                ),
            },
            Node::Group(_) => self.unresolved(
                DiagnosticKind::NamespaceTarget,
                reference,
                origin,
                diagnostics,
            ),
        }
    }

    /// Finds the node for a reference, retrying under each fallback root.
    pub fn lookup(&self, reference: &str) -> Option<(String, &'t Node)> {
        if let Some(node) = self.tree.find(reference) {
            return Some((reference.to_string(), node));
        }
        FALLBACK_PREFIXES.iter().find_map(|prefix| {
            let alternate = if reference.starts_with(&format!("{prefix}.")) {
                reference.to_string()
            } else {
                format!("{prefix}.{reference}")
            };
            self.tree.find(&alternate).map(|node| (alternate, node))
        })
    }

    fn unresolved(
        &self,
        kind: DiagnosticKind,
        reference: &str,
        origin: &Current<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Step {
        push(
            diagnostics,
            Diagnostic {
                kind,
                path: origin.path.clone(),
                reference: reference.to_string(),
            },
        );
        match self.policy {
            UnresolvedPolicy::Keep => Step::Stop(Literal::Text(format!("{{{reference}}}"))),
            UnresolvedPolicy::DeriveFromPath => Step::Continue(derive_from_path(reference)),
        }
    }
}

/// The literal a scale step's own key stands for: `2` for `2`, `1.5` for
/// `1.5`, `0` for `none`, otherwise the key itself.
pub fn derive_from_key(key: &str) -> Literal {
    if let Some(number) = parse_leading_number(key) {
        Literal::Number(number)
    } else if ZERO_SENTINELS.contains(&key) {
        Literal::Number(0.0)
    } else {
        Literal::Text(key.to_string())
    }
}

/// [`derive_from_key`] over the last dot-separated segment of a reference
/// that matched nothing in the tree.
pub fn derive_from_path(path: &str) -> Literal {
    derive_from_key(path.rsplit('.').next().unwrap_or(path))
}
