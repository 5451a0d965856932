//! Turns a Figma variables API response into one token document per
//! collection and mode.

use csscolorparser::Color;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use tracing::{info, warn};

use crate::{
    error::{Result, TokenError},
    node::Literal,
};

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub variable_collections: IndexMap<String, VariableCollection>,
    pub variables: IndexMap<String, Variable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    pub name: String,
    pub modes: Vec<Mode>,
    pub variable_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub mode_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub resolved_type: String,
    #[serde(default)]
    pub values_by_mode: IndexMap<String, VariableValue>,
}

#[derive(Debug, Deserialize)]
pub enum AliasKind {
    #[serde(rename = "VARIABLE_ALIAS")]
    VariableAlias,
}

#[derive(Debug, Deserialize)]
pub struct VariableAlias {
    #[serde(rename = "type")]
    pub kind: AliasKind,
    pub id: String,
}

/// Normalized 0..1 channels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default)]
    pub a: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Alias(VariableAlias),
    Color(Rgba),
    Bool(bool),
    Number(f64),
    Text(String),
    Other(Json),
}

/// One generated token document.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFile {
    pub file_name: String,
    pub tokens: Json,
}
impl TokenFile {
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.tokens).map_err(|e| TokenError::Figma(e.to_string()))
    }
}

pub fn parse_response(name: &str, text: &str) -> Result<ApiResponse> {
    serde_json::from_str(text).map_err(|source| TokenError::Parse {
        document: name.to_string(),
        source,
    })
}

/// Opaque colors become `#rrggbb`; translucent ones `rgba(r, g, b, a)`.
pub fn color_to_css(rgba: Rgba) -> String {
    let color = Color::new(rgba.r, rgba.g, rgba.b, rgba.a.unwrap_or(1.0));
    match rgba.a {
        Some(alpha) if alpha != 1.0 => {
            let [r, g, b, _] = color.to_rgba8();
            format!("rgba({r}, {g}, {b}, {alpha:.4})")
        }
        _ => color.to_hex_string(),
    }
}

pub fn token_type(resolved_type: &str) -> String {
    match resolved_type {
        "COLOR" => "color".to_string(),
        "FLOAT" => "number".to_string(),
        "STRING" => "string".to_string(),
        "BOOLEAN" => "boolean".to_string(),
        other => other.to_lowercase(),
    }
}

fn token_value(meta: &Meta, value: &VariableValue) -> Json {
    match value {
        VariableValue::Alias(alias) => match meta.variables.get(&alias.id) {
            Some(target) => Json::String(format!("{{{}}}", target.name.replace('/', "."))),
            None => Json::Null,
        },
        VariableValue::Color(rgba) => Json::String(color_to_css(*rgba)),
        VariableValue::Bool(b) => Json::Bool(*b),
        VariableValue::Number(n) => Json::from(&Literal::Number(*n)),
        VariableValue::Text(s) => Json::String(s.clone()),
        VariableValue::Other(json) => json.clone(),
    }
}

/// Places `token` at the `/`-separated path, creating namespaces on the way.
/// Returns false when the path runs through or onto something incompatible.
fn insert_token(root: &mut Map<String, Json>, name: &str, token: Json) -> bool {
    let parts = name.split('/').collect::<Vec<_>>();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };
    let mut current = root;
    for part in parents {
        current = match current
            .entry(part.to_string())
            .or_insert_with(|| Json::Object(Map::new()))
        {
            Json::Object(map) if !map.contains_key("$value") => map,
            _ => return false,
        };
    }
    if let Some(Json::Object(existing)) = current.get(*last) {
        if !existing.contains_key("$value") {
            return false;
        }
    }
    current.insert(last.to_string(), token);
    true
}

fn transform_collection(meta: &Meta, collection: &VariableCollection, mode: &Mode) -> Json {
    let mut tokens = Map::new();
    for variable_id in &collection.variable_ids {
        let Some(variable) = meta.variables.get(variable_id) else {
            continue;
        };
        let Some(value) = variable.values_by_mode.get(&mode.mode_id) else {
            continue;
        };
        let mut token = Map::new();
        token.insert("$type".into(), Json::String(token_type(&variable.resolved_type)));
        token.insert("$value".into(), token_value(meta, value));
        if !insert_token(&mut tokens, &variable.name, Json::Object(token)) {
            warn!(
                collection = %collection.name,
                variable = %variable.name,
                "variable path collides with an existing token or namespace, skipping"
            );
        }
    }
    Json::Object(tokens)
}

/// One document per (collection, mode), named `<collection>.<mode>.tokens.json`.
pub fn transform(response: &ApiResponse) -> Vec<TokenFile> {
    let meta = &response.meta;
    let mut files = Vec::new();
    for collection in meta.variable_collections.values() {
        info!(collection = %collection.name, "processing collection");
        for mode in &collection.modes {
            files.push(TokenFile {
                file_name: format!("{}.{}.tokens.json", collection.name, mode.name),
                tokens: transform_collection(meta, collection, mode),
            });
        }
    }
    files
}
