use crate::flatten::FlatTokens;

pub const GENERATED_HEADER: &str =
    "/* Generated from design tokens by uds-tokens build */\n/* DO NOT EDIT MANUALLY */\n";

/// Turns a flattened key into a custom property name: lowercased,
/// parenthetical notes dropped, anything outside `[a-z0-9-]` dashed,
/// dashes collapsed and trimmed.
pub fn sanitize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    let mut dashed = String::with_capacity(lower.len());
    let mut rest = lower.as_str();
    while let Some(c) = rest.chars().next() {
        if c == '(' {
            if let Some(close) = rest.find(')') {
                dashed.push('-');
                rest = &rest[close + 1..];
                continue;
            }
        }
        dashed.push(if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            c
        } else {
            '-'
        });
        rest = &rest[c.len_utf8()..];
    }
    dashed
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Custom property declarations under `:root`, preceded by the
/// generated-file header.
pub fn emit(tokens: &FlatTokens) -> String {
    let mut css = format!("{GENERATED_HEADER}\n:root {{\n");
    for (key, value) in tokens.iter() {
        css.push_str(&format!("  --{}: {};\n", sanitize_key(key), value));
    }
    css.push_str("}\n");
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Literal;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitizes_keys() {
        assert_eq!(sanitize_key("Foo Bar (Legacy)"), "foo-bar");
        assert_eq!(sanitize_key("uds-color-Brand (old)-500"), "uds-color-brand-500");
        assert_eq!(sanitize_key("--a__b--"), "a-b");
        assert_eq!(sanitize_key("design-system-text-primary"), "design-system-text-primary");
        assert_eq!(sanitize_key("spacing-1.5"), "spacing-1-5");
        assert_eq!(sanitize_key("half (open"), "half-open");
        assert_eq!(sanitize_key("Café"), "caf");
    }

    #[test]
    fn emits_root_block_with_header() {
        let tokens = FlatTokens::from_iter([
            ("system-white".to_string(), Literal::from("#ffffff")),
            ("uds-spacing-4".to_string(), Literal::Number(16.0)),
            ("Text Style (Legacy)".to_string(), Literal::from("Inter")),
        ]);
        assert_eq!(
            emit(&tokens),
            "/* Generated from design tokens by uds-tokens build */\n\
             /* DO NOT EDIT MANUALLY */\n\
             \n\
             :root {\n  \
             --system-white: #ffffff;\n  \
             --uds-spacing-4: 16;\n  \
             --text-style: Inter;\n\
             }\n"
        );
    }

    #[test]
    fn empty_mapping_still_has_header() {
        let css = emit(&FlatTokens::default());
        assert!(css.starts_with(GENERATED_HEADER));
        assert!(css.ends_with(":root {\n}\n"));
    }
}
