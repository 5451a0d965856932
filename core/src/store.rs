//! Loading token documents and deep-merging them into one tree.

use tracing::debug;

use crate::{
    error::{Result, TokenError},
    node::{Group, Node},
    resolver::{Resolver, UnresolvedPolicy},
};

/// One parsed token file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub root: Group,
    /// Keys at the top of the file, `$` metadata included.
    pub top_level_keys: usize,
}
impl Document {
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|source| TokenError::Parse {
                document: name.clone(),
                source,
            })?;
        let top_level_keys = json.as_object().map_or(0, |map| map.len());
        let root = Group::from_json(&name, json)?;
        Ok(Document {
            name,
            root,
            top_level_keys,
        })
    }
    /// True only for a literal `{}`; a file holding just metadata is not empty.
    pub fn is_empty(&self) -> bool {
        self.top_level_keys == 0
    }
}

/// The merged token tree. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tree: Group,
}

impl TokenStore {
    /// Parses every `(name, json)` pair, then merges them in the given order.
    /// A single unparseable document fails the whole load.
    pub fn load<'a>(documents: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let documents = documents
            .into_iter()
            .map(|(name, text)| Document::parse(name, text))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_documents(documents))
    }
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut tree = Group::new();
        for document in documents {
            debug!(document = %document.name, entries = document.root.len(), "merging document");
            merge(&mut tree, document.root);
        }
        TokenStore { tree }
    }
    pub fn tree(&self) -> &Group {
        &self.tree
    }
    pub fn resolver(&self, policy: UnresolvedPolicy) -> Resolver<'_> {
        Resolver::new(&self.tree, policy)
    }
}

/// Merges `source` into `target`: namespaces union recursively, and a token
/// on either side replaces whatever was there.
pub fn merge(target: &mut Group, source: Group) {
    for (key, node) in source {
        match node {
            Node::Group(incoming) => {
                if let Some(Node::Group(existing)) = target.get_mut(&key) {
                    merge(existing, incoming);
                    continue;
                }
                target.insert(key, Node::Group(incoming));
            }
            token => {
                target.insert(key, token);
            }
        }
    }
}

/// Which files take part in a build and in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSelection {
    pub suffix: String,
    pub load_order: Vec<String>,
    pub variant_markers: Vec<String>,
    pub always_include: Vec<String>,
}

impl Default for DocumentSelection {
    fn default() -> Self {
        DocumentSelection {
            suffix: ".tokens.json".to_string(),
            load_order: vec![
                "Primitives.Default.tokens.json".to_string(),
                "Core.default.tokens.json".to_string(),
                "Design System.Light.tokens.json".to_string(),
            ],
            variant_markers: vec![".Light.".to_string(), ".Dark.".to_string()],
            always_include: vec!["Design System".to_string()],
        }
    }
}

impl DocumentSelection {
    /// Every token file, canonical files first in load order, the rest by name.
    pub fn order<S: AsRef<str>>(&self, file_names: &[S]) -> Vec<String> {
        let mut names = file_names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| name.ends_with(&self.suffix))
            .map(str::to_string)
            .collect::<Vec<_>>();
        names.sort();
        names.sort_by_key(|name| {
            self.load_order
                .iter()
                .position(|canonical| canonical == name)
                .unwrap_or(self.load_order.len())
        });
        names
    }

    /// The files merged for the default build: mode variants are left out
    /// unless they belong to an always-included collection.
    pub fn select<S: AsRef<str>>(&self, file_names: &[S]) -> Vec<String> {
        self.order(file_names)
            .into_iter()
            .filter(|name| !self.is_excluded_variant(name))
            .collect()
    }

    pub fn is_excluded_variant(&self, name: &str) -> bool {
        self.variant_markers.iter().any(|marker| name.contains(marker.as_str()))
            && !self.always_include.iter().any(|stem| name.contains(stem.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Token, TokenType, TokenValue};
    use pretty_assertions::assert_eq;

    fn untyped(n: f64) -> Node {
        Node::Token(Token::new(TokenType::Other, TokenValue::Number(n)))
    }

    #[test]
    fn later_token_wins() {
        let store =
            TokenStore::load([("a", r#"{"x": {"$value": 1}}"#), ("b", r#"{"x": {"$value": 2}}"#)])
                .unwrap();
        assert_eq!(store.tree().get("x"), Some(&untyped(2.0)));
    }

    #[test]
    fn later_token_wins_with_its_type() {
        let store = TokenStore::load([
            ("a", r#"{"x": {"$type": "string", "$value": "one"}}"#),
            ("b", r#"{"x": {"$type": "number", "$value": 2}}"#),
        ])
        .unwrap();
        assert_eq!(
            store.tree().get("x"),
            Some(&Node::Token(Token::new(TokenType::Number, TokenValue::Number(2.0))))
        );
    }

    #[test]
    fn namespaces_union() {
        let store = TokenStore::load([
            ("a", r#"{"ns": {"x": {"$value": 1}}}"#),
            ("b", r#"{"ns": {"y": {"$value": 2}}}"#),
        ])
        .unwrap();
        assert_eq!(store.tree().find("ns.x"), Some(&untyped(1.0)));
        assert_eq!(store.tree().find("ns.y"), Some(&untyped(2.0)));
    }

    #[test]
    fn token_replaces_namespace_wholesale() {
        let store = TokenStore::load([
            ("a", r#"{"ns": {"x": {"$value": 1}}}"#),
            ("b", r#"{"ns": {"$value": 3}}"#),
            ("c", r#"{"t": {"$value": 1, "$type": "number"}}"#),
            ("d", r#"{"t": {"$value": "{ns}"}}"#),
        ])
        .unwrap();
        assert_eq!(store.tree().get("ns"), Some(&untyped(3.0)));
        assert_eq!(
            store.tree().get("t"),
            Some(&Node::Token(Token::new(
                TokenType::Other,
                TokenValue::Text("{ns}".to_string())
            )))
        );
    }

    #[test]
    fn one_bad_document_fails_the_load() {
        let err = TokenStore::load([("good", r#"{"x": {"$value": 1}}"#), ("bad.tokens.json", "{ nope")])
            .unwrap_err();
        assert!(err.to_string().contains("bad.tokens.json"));
    }

    #[test]
    fn canonical_files_load_first() {
        let selection = DocumentSelection::default();
        let names = [
            "zeta.tokens.json",
            "Design System.Light.tokens.json",
            "README.md",
            "Core.default.tokens.json",
            "alpha.tokens.json",
            "Primitives.Default.tokens.json",
        ];
        assert_eq!(
            selection.order(&names),
            vec![
                "Primitives.Default.tokens.json",
                "Core.default.tokens.json",
                "Design System.Light.tokens.json",
                "alpha.tokens.json",
                "zeta.tokens.json",
            ]
        );
    }

    #[test]
    fn brand_modes_are_skipped_from_the_merge() {
        let selection = DocumentSelection::default();
        let names = [
            "Weatherby.Light.tokens.json",
            "Design System.Dark.tokens.json",
            "Design System.Light.tokens.json",
            "Modio.Dark.tokens.json",
            "Core.default.tokens.json",
        ];
        assert_eq!(
            selection.select(&names),
            vec![
                "Core.default.tokens.json",
                "Design System.Light.tokens.json",
                "Design System.Dark.tokens.json",
            ]
        );
    }
}
