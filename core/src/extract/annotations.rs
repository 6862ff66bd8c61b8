#![deny(missing_docs)]

//! # Annotation Lexing
//!
//! Splits a source file into annotation blocks. An annotation is a comment line
//! whose text starts with `@key`; a block opens with `@endpoint`, `@component`
//! or `@router` and runs until the next opener or the first non-comment line.
//! Annotations seen outside any block are returned as loose annotations (the
//! main document's metadata lives there).

use regex::Regex;
use std::sync::OnceLock;

/// One `@key value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Key without the `@`, lower-cased.
    pub key: String,
    /// Remaining text, trimmed.
    pub value: String,
    /// 1-based line number.
    pub line: usize,
}

/// Kind of record a block declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `@endpoint`
    Endpoint,
    /// `@component`
    Component,
    /// `@router`
    Router,
}

impl BlockKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "endpoint" => Some(BlockKind::Endpoint),
            "component" => Some(BlockKind::Component),
            "router" => Some(BlockKind::Router),
            _ => None,
        }
    }
}

/// A group of consecutive annotations opened by a block keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// What the block declares.
    pub kind: BlockKind,
    /// The opening annotation.
    pub head: Annotation,
    /// Annotations after the head.
    pub body: Vec<Annotation>,
}

/// Result of lexing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexedFile {
    /// Blocks in file order.
    pub blocks: Vec<Block>,
    /// Annotations outside any block.
    pub loose: Vec<Annotation>,
}

fn annotation_regex() -> &'static Regex {
    static ANNOTATION_RE: OnceLock<Regex> = OnceLock::new();
    ANNOTATION_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:/{2,}!?|#+|/\*+|\*+|--)\s*@([A-Za-z][A-Za-z0-9_-]*)(?:\s+(.*?))?\s*(?:\*/)?\s*$")
            .expect("Invalid regex")
    })
}

fn comment_regex() -> &'static Regex {
    static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
    COMMENT_RE.get_or_init(|| Regex::new(r"^\s*(?://|#|/\*|\*|--)").expect("Invalid regex"))
}

/// Parses a single line. Returns `None` unless it is an annotation.
pub fn parse_line(line: &str, line_no: usize) -> Option<Annotation> {
    let caps = annotation_regex().captures(line)?;
    let key = caps.get(1)?.as_str().to_ascii_lowercase();
    let value = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(Annotation {
        key,
        value,
        line: line_no,
    })
}

/// Lexes a whole file into blocks and loose annotations.
pub fn lex(content: &str) -> LexedFile {
    let mut out = LexedFile::default();
    let mut current: Option<Block> = None;

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line, idx + 1) {
            Some(annotation) => {
                if let Some(kind) = BlockKind::from_key(&annotation.key) {
                    out.blocks.extend(current.take());
                    current = Some(Block {
                        kind,
                        head: annotation,
                        body: Vec::new(),
                    });
                } else if let Some(block) = current.as_mut() {
                    block.body.push(annotation);
                } else {
                    out.loose.push(annotation);
                }
            }
            None => {
                // Plain comment lines may sit between annotations.
                if !comment_regex().is_match(line) {
                    out.blocks.extend(current.take());
                }
            }
        }
    }
    out.blocks.extend(current.take());

    out
}

/// A whitespace-separated argument, with double quotes honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Text with quotes removed.
    pub text: String,
    /// Whether the argument was quoted.
    pub quoted: bool,
}

/// Splits an annotation value into arguments.
///
/// `a "b c" d` yields `a`, `b c` (quoted), `d`. An unterminated quote runs to
/// the end of the value.
pub fn split_args(value: &str) -> Vec<Arg> {
    let mut args = Vec::new();
    let mut chars = value.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut text = String::new();
            for ch in chars.by_ref() {
                if ch == '"' {
                    break;
                }
                text.push(ch);
            }
            args.push(Arg { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                text.push(ch);
                chars.next();
            }
            args.push(Arg {
                text,
                quoted: false,
            });
        }
    }

    args
}

/// Joins the remaining arguments into one description, if any.
pub fn join_rest(args: &[Arg]) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    let text = args
        .iter()
        .map(|a| a.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(text)
}
