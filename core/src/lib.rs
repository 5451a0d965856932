//! Design token pipeline: merge token documents, resolve aliases, and render
//! CSS custom properties and Tailwind configuration from the result.

pub mod css;
pub mod error;
mod expression;
pub mod figma;
pub mod flatten;
pub mod node;
pub mod palette;
pub mod resolver;
pub mod store;
pub mod tailwind;
pub mod validate;

pub use error::{Result, TokenError};
pub use expression::{is_hex_color, is_rgb_function, Expression, Segment};
pub use flatten::{flatten, FlatTokens};
pub use node::{Group, Literal, Node, Token, TokenType, TokenValue};
pub use palette::PaletteExtractor;
pub use resolver::{Diagnostic, DiagnosticKind, Diagnostics, Resolver, UnresolvedPolicy};
pub use store::{Document, DocumentSelection, TokenStore};
pub use validate::{validate, Report};
