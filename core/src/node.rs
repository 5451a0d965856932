use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::warn;

use crate::error::{Result, TokenError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TokenType {
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(other)]
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Composite(Json),
}
impl TokenValue {
    /// Scalar values only; `null` and composites have no literal form.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            TokenValue::Bool(b) => Some(Literal::Bool(*b)),
            TokenValue::Number(n) => Some(Literal::Number(*n)),
            TokenValue::Text(s) => Some(Literal::Text(s.clone())),
            TokenValue::Null | TokenValue::Composite(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Token {
    #[serde(rename = "$type", default)]
    pub type_: TokenType,
    #[serde(rename = "$value")]
    pub value: TokenValue,
    #[serde(rename = "$description", default)]
    pub description: Option<String>,
}
impl Token {
    pub fn new(type_: TokenType, value: TokenValue) -> Self {
        Token {
            type_,
            value,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Token(Token),
    Group(Group),
}

/// An ordered namespace of tokens and nested namespaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group(IndexMap<String, Node>);

impl Group {
    pub fn new() -> Self {
        Group(IndexMap::new())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.0.get_mut(key)
    }
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        self.0.insert(key.into(), node)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.0.iter()
    }
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
    pub fn group(&self, key: &str) -> Option<&Group> {
        match self.0.get(key) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Looks up a dot path. Keys that themselves contain dots (a `1.5`
    /// spacing step) are matched by trying joined runs of segments,
    /// shortest first.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let segments = path.split('.').collect::<Vec<_>>();
        self.find_segments(&segments)
    }
    fn find_segments(&self, segments: &[&str]) -> Option<&Node> {
        for end in 1..=segments.len() {
            let Some(node) = self.0.get(&segments[..end].join(".")) else {
                continue;
            };
            let rest = &segments[end..];
            if rest.is_empty() {
                return Some(node);
            }
            if let Node::Group(group) = node {
                if let Some(found) = group.find_segments(rest) {
                    return Some(found);
                }
            }
        }
        None
    }
    pub fn find_group(&self, path: &str) -> Option<&Group> {
        match self.find(path) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Every token below this group, depth first, with its path segments.
    pub fn tokens(&self) -> Vec<(Vec<&str>, &Token)> {
        let mut out = Vec::new();
        self.collect_tokens(&mut Vec::new(), &mut out);
        out
    }
    fn collect_tokens<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<(Vec<&'a str>, &'a Token)>) {
        for (key, node) in &self.0 {
            path.push(key);
            match node {
                Node::Token(token) => out.push((path.clone(), token)),
                Node::Group(group) => group.collect_tokens(path, out),
            }
            path.pop();
        }
    }

    /// Builds a group from a parsed JSON document. The root must be an object.
    pub fn from_json(document: &str, json: Json) -> Result<Group> {
        match json {
            Json::Object(map) => group_from_map(document, &mut Vec::new(), map),
            _ => Err(TokenError::MalformedNode {
                document: document.to_string(),
                path: "(root)".to_string(),
                reason: "document root is not an object".to_string(),
            }),
        }
    }
}

impl IntoIterator for Group {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Node)> for Group {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Group(iter.into_iter().collect())
    }
}

fn group_from_map(
    document: &str,
    path: &mut Vec<String>,
    map: serde_json::Map<String, Json>,
) -> Result<Group> {
    let mut group = Group::new();
    for (key, value) in map {
        // `$type`, `$description` and friends on a namespace are metadata.
        if key.starts_with('$') {
            continue;
        }
        path.push(key.clone());
        let node = node_from_json(document, path, value)?;
        path.pop();
        if let Some(node) = node {
            group.insert(key, node);
        }
    }
    Ok(group)
}

fn node_from_json(document: &str, path: &mut Vec<String>, json: Json) -> Result<Option<Node>> {
    match json {
        Json::Object(map) if map.contains_key("$value") => {
            if let Some(child) = map
                .iter()
                .find(|(key, value)| !key.starts_with('$') && value.is_object())
                .map(|(key, _)| key.clone())
            {
                return Err(TokenError::MalformedNode {
                    document: document.to_string(),
                    path: path.join("."),
                    reason: format!("token also carries nested child `{child}`"),
                });
            }
            let token = serde_json::from_value::<Token>(Json::Object(map)).map_err(|source| {
                TokenError::Parse {
                    document: document.to_string(),
                    source,
                }
            })?;
            Ok(Some(Node::Token(token)))
        }
        Json::Object(map) => Ok(Some(Node::Group(group_from_map(document, path, map)?))),
        other => {
            warn!(document, path = %path.join("."), value = %other, "skipping bare value outside a token");
            Ok(None)
        }
    }
}

/// A fully resolved scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
    Bool(bool),
}
impl Literal {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }
}
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => f.write_str(s),
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}
impl From<&Literal> for Json {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Text(s) => Json::String(s.clone()),
            Literal::Number(n) if is_integral(*n) => Json::from(*n as i64),
            Literal::Number(n) => Json::from(*n),
            Literal::Bool(b) => Json::Bool(*b),
        }
    }
}
impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}
impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

/// Integral numbers print without a fractional part (`4`, not `4.0`).
pub fn format_number(n: f64) -> String {
    if is_integral(n) {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub(crate) fn dot_path(segments: &[&str]) -> String {
    segments.iter().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn tokens_and_groups_are_tagged() {
        let group = Group::from_json(
            "test",
            json!({
                "$description": "ignored",
                "uds": {
                    "$type": "number",
                    "radius": {
                        "none": { "$type": "number", "$value": 0 },
                        "md": { "$type": "number", "$value": "{uds.radius.2}", "$description": "medium" }
                    }
                }
            }),
        )
        .unwrap();
        assert!(matches!(group.get("uds"), Some(Node::Group(_))));
        assert_eq!(
            group.find("uds.radius.none"),
            Some(&Node::Token(Token::new(TokenType::Number, TokenValue::Number(0.0))))
        );
        let Some(Node::Token(md)) = group.find("uds.radius.md") else {
            panic!("expected token");
        };
        assert_eq!(md.value, TokenValue::Text("{uds.radius.2}".to_string()));
        assert_eq!(md.description.as_deref(), Some("medium"));
    }

    #[test]
    fn null_value_still_marks_a_token() {
        let group = Group::from_json("test", json!({ "x": { "$value": null } })).unwrap();
        assert_eq!(
            group.get("x"),
            Some(&Node::Token(Token::new(TokenType::Other, TokenValue::Null)))
        );
    }

    #[test]
    fn unknown_type_maps_to_other() {
        let group =
            Group::from_json("test", json!({ "x": { "$type": "dimension", "$value": "4px" } })).unwrap();
        let Some(Node::Token(token)) = group.get("x") else {
            panic!("expected token");
        };
        assert_eq!(token.type_, TokenType::Other);
    }

    #[test]
    fn mixed_node_is_rejected() {
        let err = Group::from_json(
            "Core.default.tokens.json",
            json!({ "a": { "$value": 1, "b": { "$value": 2 } } }),
        )
        .unwrap_err();
        match err {
            TokenError::MalformedNode { path, .. } => assert_eq!(path, "a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(Group::from_json("test", json!([1, 2])).is_err());
    }

    #[test]
    fn bare_scalars_are_skipped() {
        let group = Group::from_json("test", json!({ "ns": { "x": 1, "y": { "$value": 2 } } })).unwrap();
        let ns = group.group("ns").unwrap();
        assert_eq!(ns.keys().collect::<Vec<_>>(), vec!["y"]);
    }

    #[test]
    fn find_handles_dotted_keys() {
        let group = Group::from_json(
            "test",
            json!({ "uds": { "spacing": { "1.5": { "$value": 6 }, "1": { "$value": 4 } } } }),
        )
        .unwrap();
        assert!(group.find("uds.spacing.1.5").is_some());
        assert!(group.find("uds.spacing.1").is_some());
        assert!(group.find("uds.spacing.2").is_none());
        assert!(group.find_group("uds.spacing").is_some());
    }

    #[test]
    fn tokens_walk_depth_first() {
        let group = Group::from_json(
            "test",
            json!({ "a": { "b": { "$value": 5 }, "c": { "d": { "$value": 6 } } }, "e": { "$value": 7 } }),
        )
        .unwrap();
        let paths = group
            .tokens()
            .into_iter()
            .map(|(path, _)| dot_path(&path))
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["a.b", "a.c.d", "e"]);
    }

    #[test]
    fn numbers_format_like_css() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(Literal::Number(12.0).to_string(), "12");
        assert_eq!(Json::from(&Literal::Number(12.0)).to_string(), "12");
        assert_eq!(Json::from(&Literal::Number(1.5)).to_string(), "1.5");
    }
}
