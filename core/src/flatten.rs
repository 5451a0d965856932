use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    node::{dot_path, Literal},
    resolver::{Diagnostic, DiagnosticKind, Diagnostics, Resolver},
};

pub const SEPARATOR: &str = "-";

/// Resolved tokens keyed by their `-`-joined path, in tree order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatTokens(IndexMap<String, Literal>);

impl FlatTokens {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.0.get(key)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Literal)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Literal)> for FlatTokens {
    fn from_iter<I: IntoIterator<Item = (String, Literal)>>(iter: I) -> Self {
        FlatTokens(iter.into_iter().collect())
    }
}

/// Flattens the resolver's tree, resolving each token against it. Two paths
/// that join to the same key keep the value visited last.
pub fn flatten(resolver: &Resolver<'_>, diagnostics: &mut Diagnostics) -> FlatTokens {
    let mut out = IndexMap::new();
    for (path, token) in resolver.tree().tokens() {
        let current_path = dot_path(&path);
        match resolver.resolve_value(&token.value, &path, diagnostics) {
            Some(literal) => {
                out.insert(path.iter().join(SEPARATOR), literal);
            }
            None => {
                diagnostics.insert(Diagnostic {
                    kind: DiagnosticKind::NonScalar,
                    path: current_path,
                    reference: String::new(),
                });
            }
        }
    }
    FlatTokens(out)
}
