use std::fmt;

/// One piece of a token value string: literal text or a `{dot.path}` reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Ref(String),
}

/// A token value string split into text and references.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression(pub Vec<Segment>);

impl Expression {
    pub fn parse(input: &str) -> Expression {
        match expr_parser::expression(input) {
            Ok(segments) => Expression(segments),
            Err(_) => Expression(vec![Segment::Text(input.to_string())]),
        }
    }
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|segment| match segment {
            Segment::Ref(path) => Some(path.as_str()),
            Segment::Text(_) => None,
        })
    }
    pub fn has_references(&self) -> bool {
        self.references().next().is_some()
    }
    /// The path when the whole expression is exactly one reference.
    pub fn single_reference(&self) -> Option<&str> {
        match self.0.as_slice() {
            [Segment::Ref(path)] => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Ref(path) => write!(f, "{{{path}}}")?,
            }
        }
        Ok(())
    }
}

/// `#RRGGBB` or `#RRGGBBAA`.
pub fn is_hex_color(value: &str) -> bool {
    expr_parser::hex_color(value).is_ok()
}

/// Starts with `rgb(` or `rgba(`.
pub fn is_rgb_function(value: &str) -> bool {
    expr_parser::rgb_function(value).is_ok()
}

/// Longest numeric prefix after leading whitespace; trailing text is ignored,
/// so `"2xl"` gives `2.0`.
pub fn parse_leading_number(value: &str) -> Option<f64> {
    expr_parser::leading_number(value).ok()
}

peg::parser! {
  grammar expr_parser() for str {
    rule ws() = quiet!{[' ' | '\n' | '\t' | '\r']*}

    rule reference() -> Segment
        = "{" p:$((!"}" [_])+) "}" { Segment::Ref(p.to_string()) }

    rule text() -> Segment
        = t:$((!reference() [_])+) { Segment::Text(t.to_string()) }

    pub(crate) rule expression() -> Vec<Segment> = (reference() / text())*

    rule hex() = ['0'..='9' | 'a'..='f' | 'A'..='F']

    pub(crate) rule hex_color() = "#" hex()*<6> (hex()*<2>)?

    pub(crate) rule rgb_function() = "rgb" "a"? "(" [_]*

    rule digits() = ['0'..='9']+

    pub(crate) rule leading_number() -> f64
        = ws() n:$(['+' | '-']? (digits() ("." ['0'..='9']*)? / "." digits()) (['e' | 'E'] ['+' | '-']? digits())?) [_]*
        {? n.parse().or(Err("number")) }
  }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_text_and_references() {
        assert_eq!(
            Expression::parse("{hello.world}"),
            Expression(vec![Segment::Ref("hello.world".to_string())])
        );
        assert_eq!(
            Expression::parse("0 0 {uds.spacing.2} {system.black}"),
            Expression(vec![
                Segment::Text("0 0 ".to_string()),
                Segment::Ref("uds.spacing.2".to_string()),
                Segment::Text(" ".to_string()),
                Segment::Ref("system.black".to_string()),
            ])
        );
        assert_eq!(
            Expression::parse("ABC Diatype Variable"),
            Expression(vec![Segment::Text("ABC Diatype Variable".to_string())])
        );
        assert_eq!(Expression::parse(""), Expression(vec![]));
    }

    #[test]
    fn braces_without_path_stay_text() {
        let expr = Expression::parse("{} and {unclosed");
        assert!(!expr.has_references());
        assert_eq!(expr.to_string(), "{} and {unclosed");
    }

    #[test]
    fn single_reference_only_for_whole_value() {
        assert_eq!(Expression::parse("{a.b}").single_reference(), Some("a.b"));
        assert_eq!(Expression::parse("{a.b}px").single_reference(), None);
        assert_eq!(Expression::parse("{a}{b}").single_reference(), None);
    }

    #[test]
    fn display_round_trips_references() {
        let text = "calc({uds.spacing.4} * 2)";
        assert_eq!(Expression::parse(text).to_string(), text);
    }

    #[test]
    fn color_literals() {
        assert!(is_hex_color("#ff00ff"));
        assert!(is_hex_color("#FF00FF80"));
        assert!(!is_hex_color("#fff"));
        assert!(!is_hex_color("#ff00ff8"));
        assert!(!is_hex_color("not-a-color"));
        assert!(is_rgb_function("rgba(0, 0, 0, 0.5000)"));
        assert!(is_rgb_function("rgb(1,2,3)"));
        assert!(!is_rgb_function("hsl(0, 0%, 0%)"));
    }

    #[test]
    fn leading_number_is_lenient() {
        assert_eq!(parse_leading_number("2"), Some(2.0));
        assert_eq!(parse_leading_number("1.5"), Some(1.5));
        assert_eq!(parse_leading_number("2xl"), Some(2.0));
        assert_eq!(parse_leading_number(" -4px"), Some(-4.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("none"), None);
        assert_eq!(parse_leading_number("{uds.radius.md}"), None);
    }
}
