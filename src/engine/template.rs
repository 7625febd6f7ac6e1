//! Substitution templates for action parameters.
//!
//! Supported syntax:
//! - `$1`, `${1}` - numbered capture from the last match
//! - `${name}` - named capture from the last match
//! - `$(name)` - context property
//! - `${fn(...)}`, `${fn:...}` - transform applied to the expanded inner template
//! - `$$` - literal `$`
//!
//! Templates are compiled when the configuration is loaded; transforms are
//! resolved at that point, so an unknown transform name is a load error.

use std::fmt;
use thiserror::Error;

use crate::engine::context::RewriteContext;
use crate::transforms::{Transform, TransformTable};

/// Template compilation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated '{0}' expression")]
    Unterminated(&'static str),

    #[error("empty expression")]
    EmptyExpression,

    #[error("capture index '{0}' is out of range")]
    InvalidGroup(String),

    #[error("transform '{0}' is not defined")]
    UnknownTransform(String),
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Group(usize),
    Named(String),
    Property(String),
    Transform { transform: Transform, input: Template },
}

/// A compiled substitution template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(source: &str, transforms: &TransformTable) -> Result<Self, TemplateError> {
        Ok(Self {
            source: source.to_string(),
            segments: parse_segments(source, transforms)?,
        })
    }

    /// A template that expands to `text` verbatim.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            segments: vec![Segment::Literal(text.clone())],
            source: text,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expand against the context. Missing captures and properties expand to
    /// the empty string.
    pub fn expand(&self, ctx: &RewriteContext) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.expand_into(ctx, &mut out);
        out
    }

    fn expand_into(&self, ctx: &RewriteContext, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(index) => {
                    if let Some(value) = ctx.last_match().and_then(|m| m.group(*index)) {
                        out.push_str(value);
                    }
                }
                Segment::Named(name) => {
                    if let Some(value) = ctx.last_match().and_then(|m| m.named(name)) {
                        out.push_str(value);
                    }
                }
                Segment::Property(key) => {
                    if let Some(value) = ctx.property(key) {
                        out.push_str(value);
                    }
                }
                Segment::Transform { transform, input } => {
                    out.push_str(&transform.apply(&input.expand(ctx)));
                }
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(
    source: &str,
    transforms: &TransformTable,
) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while let Some(ch) = source[i..].chars().next() {
        if ch != '$' {
            literal.push(ch);
            i += ch.len_utf8();
            continue;
        }

        let after = &source[i + 1..];
        if after.starts_with('$') {
            literal.push('$');
            i += 2;
            continue;
        }

        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            flush(&mut literal, &mut segments);
            segments.push(parse_group(&after[..digits])?);
            i += 1 + digits;
            continue;
        }

        let brackets = match after.chars().next() {
            Some('{') => Some(('{', '}', "${")),
            Some('(') => Some(('(', ')', "$(")),
            _ => None,
        };

        match brackets {
            Some((open, close, label)) => {
                let end = find_closing(after, open, close)
                    .ok_or(TemplateError::Unterminated(label))?;
                let body = &after[1..end];
                flush(&mut literal, &mut segments);
                segments.push(if open == '{' {
                    parse_expression(body, transforms)?
                } else {
                    parse_property(body)?
                });
                i += 1 + end + 1;
            }
            None => {
                literal.push('$');
                i += 1;
            }
        }
    }

    flush(&mut literal, &mut segments);
    Ok(segments)
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Byte offset of the bracket closing the one at offset 0.
fn find_closing(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(offset);
            }
        }
    }
    None
}

fn parse_group(digits: &str) -> Result<Segment, TemplateError> {
    digits
        .parse()
        .map(Segment::Group)
        .map_err(|_| TemplateError::InvalidGroup(digits.to_string()))
}

fn parse_property(body: &str) -> Result<Segment, TemplateError> {
    match body.trim() {
        "" => Err(TemplateError::EmptyExpression),
        key => Ok(Segment::Property(key.to_string())),
    }
}

fn parse_expression(body: &str, transforms: &TransformTable) -> Result<Segment, TemplateError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(TemplateError::EmptyExpression);
    }
    if body.bytes().all(|b| b.is_ascii_digit()) {
        return parse_group(body);
    }

    // ${fn(inner)}
    if let Some(open) = body.find('(') {
        let name = &body[..open];
        if is_identifier(name) && body.ends_with(')') {
            let inner = &body[open + 1..body.len() - 1];
            return transform_segment(name, inner, transforms);
        }
    }

    // ${fn:inner}
    if let Some(colon) = body.find(':') {
        let name = &body[..colon];
        if is_identifier(name) {
            return transform_segment(name, &body[colon + 1..], transforms);
        }
    }

    Ok(Segment::Named(body.to_string()))
}

fn transform_segment(
    name: &str,
    inner: &str,
    transforms: &TransformTable,
) -> Result<Segment, TemplateError> {
    let transform = transforms
        .get(name)
        .cloned()
        .ok_or_else(|| TemplateError::UnknownTransform(name.to_string()))?;
    let input = Template::compile(inner, transforms)?;
    Ok(Segment::Transform { transform, input })
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
