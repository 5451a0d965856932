//! Renders extracted palettes and scales as Tailwind configuration modules.

use serde_json::{json, Map, Value as Json};

use crate::{
    error::Result,
    palette::{BrandPalette, PaletteExtractor, Scale, SystemColors},
    resolver::Diagnostics,
};

pub const BASE_CONFIG_FILE: &str = "tailwind.config.cjs";

const CONFIG_TYPE_COMMENT: &str = "/** @type {import('tailwindcss').Config} */";
const GENERATED_NOTE: &str = "// Generated from design tokens by uds-tokens tailwind. Do not edit manually.";

const CONTENT_GLOBS: [&str; 2] = [
    "./src/**/*.{js,ts,jsx,tsx,mdx}",
    "./.storybook/**/*.{js,ts,jsx,tsx}",
];

/// Name, font size, line height.
const FONT_SIZES: [(&str, &str, &str); 11] = [
    ("xs", "12px", "18px"),
    ("sm", "14px", "20px"),
    ("md", "16px", "24px"),
    ("lg", "18px", "28px"),
    ("xl", "20px", "30px"),
    ("2xl", "24px", "32px"),
    ("3xl", "30px", "38px"),
    ("4xl", "36px", "44px"),
    ("5xl", "48px", "60px"),
    ("6xl", "60px", "72px"),
    ("7xl", "72px", "90px"),
];

const FONT_STACK: [&str; 3] = ["Inter", "system-ui", "sans-serif"];

const FONT_WEIGHTS: [(&str, &str); 4] = [
    ("regular", "400"),
    ("medium", "500"),
    ("semibold", "600"),
    ("bold", "700"),
];

const BOX_SHADOWS: [(&str, &str); 7] = [
    ("xs", "0px 1px 2px 0px rgba(10, 13, 18, 0.05)"),
    ("sm", "0px 1px 2px 0px rgba(10, 13, 18, 0.06), 0px 1px 3px 0px rgba(10, 13, 18, 0.10)"),
    ("md", "0px 2px 4px -2px rgba(10, 13, 18, 0.06), 0px 4px 8px -2px rgba(10, 13, 18, 0.10)"),
    ("lg", "0px 4px 6px -2px rgba(10, 13, 18, 0.05), 0px 12px 16px -4px rgba(10, 13, 18, 0.10)"),
    ("xl", "0px 8px 8px -4px rgba(10, 13, 18, 0.04), 0px 20px 24px -4px rgba(10, 13, 18, 0.10)"),
    ("2xl", "0px 24px 48px -12px rgba(10, 13, 18, 0.25)"),
    ("3xl", "0px 32px 64px -12px rgba(10, 13, 18, 0.20)"),
];

/// A rendered configuration module and the file name it belongs in.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub file_name: String,
    pub contents: String,
}

pub fn brand_config_file(brand: &str) -> String {
    format!("tailwind.config.{brand}.js")
}

/// Renders the base config and one config per brand. Every file is rendered
/// before any is returned, so a missing root color yields no output at all.
pub fn generate(
    extractor: &PaletteExtractor<'_>,
    brands: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ConfigFile>> {
    let system = extractor.system_colors(diagnostics)?;
    let spacing = extractor.scale("uds.spacing", diagnostics);
    let radius = extractor.scale("uds.radius", diagnostics);

    let mut files = vec![ConfigFile {
        file_name: BASE_CONFIG_FILE.to_string(),
        contents: render_base(&system, &spacing, &radius),
    }];
    for brand in brands {
        if let Some(palette) = extractor.brand_palette(brand, diagnostics) {
            files.push(ConfigFile {
                file_name: brand_config_file(brand),
                contents: render_brand(&palette),
            });
        }
    }
    Ok(files)
}

fn scale_json(scale: &Scale) -> Json {
    Json::Object(
        scale
            .iter()
            .map(|(key, value)| (key.clone(), Json::from(value)))
            .collect(),
    )
}

fn pairs_json<'a>(pairs: impl IntoIterator<Item = (&'a str, Json)>) -> Json {
    Json::Object(
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<Map<_, _>>(),
    )
}

pub fn colors_json(system: &SystemColors) -> Json {
    let white = Json::from(&system.white);
    let black = Json::from(&system.black);
    let mut colors = Map::new();
    colors.insert("white".into(), white.clone());
    colors.insert("black".into(), black.clone());
    colors.insert("transparent".into(), json!("transparent"));
    colors.insert(
        "base".into(),
        json!({ "white": white, "black": black, "transparent": "transparent" }),
    );
    colors.insert("gray".into(), scale_json(&system.gray));
    for (name, scale) in system.families() {
        colors.insert(name.to_string(), scale_json(scale));
    }
    Json::Object(colors)
}

pub fn render_base(system: &SystemColors, spacing: &Scale, radius: &Scale) -> String {
    let font_size = pairs_json(
        FONT_SIZES
            .iter()
            .map(|(name, size, line_height)| (*name, json!([size, { "lineHeight": line_height }]))),
    );
    let font_weight = pairs_json(FONT_WEIGHTS.iter().map(|(name, weight)| (*name, json!(weight))));
    let box_shadow = pairs_json(BOX_SHADOWS.iter().map(|(name, shadow)| (*name, json!(shadow))));
    let config = json!({
        "content": CONTENT_GLOBS,
        "theme": {
            "colors": colors_json(system),
            "spacing": scale_json(spacing),
            "borderRadius": scale_json(radius),
            "fontSize": font_size,
            "fontFamily": { "display": FONT_STACK, "body": FONT_STACK },
            "fontWeight": font_weight,
            "extend": { "boxShadow": box_shadow },
        },
        "plugins": [],
    });
    format!(
        "{CONFIG_TYPE_COMMENT}\n{GENERATED_NOTE}\nmodule.exports = {};\n",
        to_js(&config, 0)
    )
}

pub fn render_brand(palette: &BrandPalette) -> String {
    let mut entries = Vec::new();
    if let Some(brand) = &palette.brand {
        entries.push(("brand", brand));
    }
    if let Some(primary) = palette.primary() {
        entries.push(("primary", primary));
    }
    if let Some(secondary) = &palette.secondary {
        entries.push(("secondary", secondary));
    }
    let mut colors = String::new();
    for (name, scale) in entries {
        colors.push_str(&format!("      {name}: {},\n", to_js(&scale_json(scale), 6)));
    }
    format!(
        "{CONFIG_TYPE_COMMENT}\n\
         {GENERATED_NOTE}\n\
         const baseConfig = require('./{BASE_CONFIG_FILE}');\n\
         \n\
         module.exports = {{\n  \
         ...baseConfig,\n  \
         theme: {{\n    \
         ...baseConfig.theme,\n    \
         colors: {{\n      \
         ...baseConfig.theme.colors,\n      \
         // {} brand colors\n\
         {colors}    \
         }},\n  \
         }},\n\
         }};\n",
        capitalize(&palette.name),
    )
}

/// Upper-cases the first character only, so `locum-smart` reads `Locum-smart`.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bare identifiers and plain integers need no quotes as object keys.
fn js_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    let integer = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if identifier || integer {
        key.to_string()
    } else {
        Json::from(key).to_string()
    }
}

/// JavaScript object-literal text for a JSON value. Objects nest one key per
/// line with trailing commas; arrays stay on one line.
pub fn to_js(value: &Json, indent: usize) -> String {
    match value {
        Json::Object(map) if map.is_empty() => "{}".to_string(),
        Json::Object(map) => {
            let pad = " ".repeat(indent + 2);
            let mut out = String::from("{\n");
            for (key, value) in map {
                out.push_str(&format!("{pad}{}: {},\n", js_key(key), to_js(value, indent + 2)));
            }
            out.push_str(&" ".repeat(indent));
            out.push('}');
            out
        }
        Json::Array(items) => {
            let items = items.iter().map(inline_js).collect::<Vec<_>>();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

fn inline_js(value: &Json) -> String {
    match value {
        Json::Object(map) if map.is_empty() => "{}".to_string(),
        Json::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, value)| format!("{}: {}", js_key(key), inline_js(value)))
                .collect::<Vec<_>>();
            format!("{{ {} }}", entries.join(", "))
        }
        Json::Array(_) => to_js(value, 0),
        other => other.to_string(),
    }
}
