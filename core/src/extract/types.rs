//! Type-expression parsing: `string`, `integer(int64)`, `[]Pet`, `map[User]`.

use crate::model::{Primitive, SchemaNode};

/// Parses a type expression into a schema tree.
///
/// Anything that is not a primitive keyword becomes an unbound reference.
pub fn parse_type(expr: &str) -> Result<SchemaNode, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err("empty type expression".to_string());
    }

    if let Some(rest) = expr.strip_prefix("[]") {
        return Ok(SchemaNode::Array(Box::new(parse_type(rest)?)));
    }

    if let Some(inner) = expr.strip_prefix("map[") {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| format!("unterminated map type '{}'", expr))?;
        return Ok(SchemaNode::Map(Box::new(parse_type(inner)?)));
    }

    let (name, format) = match expr.find('(') {
        Some(open) => {
            let format = expr[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| format!("unterminated format in '{}'", expr))?
                .trim();
            if format.is_empty() {
                return Err(format!("empty format in '{}'", expr));
            }
            (&expr[..open], Some(format.to_string()))
        }
        None => (expr, None),
    };

    if !is_identifier(name) {
        return Err(format!("invalid type expression '{}'", expr));
    }

    match (Primitive::parse(name), format) {
        (Some(kind), format) => Ok(SchemaNode::Primitive { kind, format }),
        (None, None) => Ok(SchemaNode::reference(name)),
        (None, Some(_)) => Err(format!(
            "only primitive types take a format, got '{}'",
            expr
        )),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
