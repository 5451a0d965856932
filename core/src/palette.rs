//! Pulls framework-ready color palettes and numeric scales out of the
//! primitives and core token trees.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::{Result, TokenError},
    expression::{parse_leading_number, Expression},
    node::{format_number, Literal, Node, Token, TokenType},
    resolver::{Diagnostics, Resolver},
};

pub const BASE_UNIT: &str = "px";

/// Accent families copied from `system.accent`, in output order.
pub const ACCENT_FAMILIES: [&str; 13] = [
    "red", "orange", "yellow", "lime", "green", "sky", "cyan", "blue", "indigo", "purple",
    "magenta", "rose", "amber",
];

/// Semantic family names and the accent family each one mirrors.
pub const SEMANTIC_ALIASES: [(&str, &str); 4] = [
    ("error", "red"),
    ("destructive", "red"),
    ("warning", "yellow"),
    ("success", "green"),
];

/// Shade or step name to resolved value.
pub type Scale = IndexMap<String, Literal>;

#[derive(Debug, Clone, PartialEq)]
pub struct SystemColors {
    pub white: Literal,
    pub black: Literal,
    pub gray: Scale,
    pub accents: IndexMap<String, Scale>,
}
impl SystemColors {
    /// Accent families followed by the semantic aliases whose source exists.
    pub fn families(&self) -> Vec<(&str, &Scale)> {
        let mut families = self
            .accents
            .iter()
            .map(|(name, scale)| (name.as_str(), scale))
            .collect::<Vec<_>>();
        for (alias, source) in SEMANTIC_ALIASES {
            if let Some(scale) = self.accents.get(source) {
                families.push((alias, scale));
            }
        }
        families
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandPalette {
    pub name: String,
    pub brand: Option<Scale>,
    pub secondary: Option<Scale>,
}
impl BrandPalette {
    /// `primary` is the older name for the brand family.
    pub fn primary(&self) -> Option<&Scale> {
        self.brand.as_ref()
    }
}

/// Converts a resolved number into a length in [`BASE_UNIT`]. Text that
/// still starts with a number is converted too; anything else passes through.
pub fn to_length(literal: Literal) -> Literal {
    let number = match &literal {
        Literal::Number(n) => *n,
        Literal::Text(text) => match parse_leading_number(text) {
            Some(n) => n,
            None => return literal,
        },
        Literal::Bool(_) => return literal,
    };
    if number == 0.0 {
        Literal::Text(format!("0{BASE_UNIT}"))
    } else {
        Literal::Text(format!("{}{BASE_UNIT}", format_number(number)))
    }
}

pub struct PaletteExtractor<'t> {
    resolver: Resolver<'t>,
    source: String,
}

impl<'t> PaletteExtractor<'t> {
    /// `source` names the primitives document in error messages.
    pub fn new(resolver: Resolver<'t>, source: impl Into<String>) -> Self {
        PaletteExtractor {
            resolver,
            source: source.into(),
        }
    }

    pub fn transform_token(
        &self,
        token: &Token,
        path: &[&str],
        diagnostics: &mut Diagnostics,
    ) -> Option<Literal> {
        let literal = self.resolver.resolve_value(&token.value, path, diagnostics)?;
        Some(match token.type_ {
            TokenType::Number => to_length(literal),
            _ => literal,
        })
    }

    /// Every token directly under `path`; nested namespaces and values with
    /// no literal are left out.
    pub fn scale(&self, path: &str, diagnostics: &mut Diagnostics) -> Scale {
        let Some(group) = self.resolver.tree().find_group(path) else {
            debug!(path, "scale namespace not found");
            return Scale::new();
        };
        let mut token_path = path.split('.').collect::<Vec<_>>();
        let mut scale = Scale::new();
        for (key, node) in group.iter() {
            let Node::Token(token) = node else {
                continue;
            };
            token_path.push(key);
            if let Some(value) = self.transform_token(token, &token_path, diagnostics) {
                scale.insert(key.clone(), value);
            }
            token_path.pop();
        }
        scale
    }

    /// A root color every config depends on; absent or unresolvable is fatal.
    fn required(&self, path: &str) -> Result<Literal> {
        let Some(Node::Token(token)) = self.resolver.tree().find(path) else {
            return Err(TokenError::MissingRootToken {
                path: path.to_string(),
                document: self.source.clone(),
            });
        };
        let mut diagnostics = Diagnostics::new();
        let token_path = path.split('.').collect::<Vec<_>>();
        let literal = self
            .resolver
            .resolve_value(&token.value, &token_path, &mut diagnostics);
        match literal {
            Some(literal)
                if diagnostics.is_empty()
                    && !literal
                        .as_text()
                        .is_some_and(|text| Expression::parse(text).has_references()) =>
            {
                Ok(literal)
            }
            Some(literal) => Err(TokenError::UnresolvedRootToken {
                path: path.to_string(),
                value: literal.to_string(),
            }),
            None => Err(TokenError::MissingRootToken {
                path: path.to_string(),
                document: self.source.clone(),
            }),
        }
    }

    pub fn system_colors(&self, diagnostics: &mut Diagnostics) -> Result<SystemColors> {
        let white = self.required("system.white")?;
        let black = self.required("system.black")?;
        let gray = self.scale("system.neutrals", diagnostics);
        let mut accents = IndexMap::new();
        for family in ACCENT_FAMILIES {
            let path = format!("system.accent.{family}");
            if self.resolver.tree().find_group(&path).is_some() {
                accents.insert(family.to_string(), self.scale(&path, diagnostics));
            }
        }
        Ok(SystemColors {
            white,
            black,
            gray,
            accents,
        })
    }

    /// The brand's palette, or `None` when the brand namespace is absent.
    pub fn brand_palette(&self, name: &str, diagnostics: &mut Diagnostics) -> Option<BrandPalette> {
        let Some(group) = self.resolver.tree().group(name) else {
            warn!(brand = name, "no colors found for brand, skipping");
            return None;
        };
        let scale_of = |family: &str, diagnostics: &mut Diagnostics| {
            group
                .group(family)
                .map(|_| self.scale(&format!("{name}.{family}"), diagnostics))
        };
        let brand = scale_of("primary", diagnostics);
        let secondary = scale_of("secondary", diagnostics);
        Some(BrandPalette {
            name: name.to_string(),
            brand,
            secondary,
        })
    }
}
