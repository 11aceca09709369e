//! Parser de un subconjunto de N-Triples orientado a líneas.
//!
//! Términos aceptados: `<iri>`, `prefix:name`, `_:blank`, `"literal"` con
//! `@lang` o `^^tipo` opcional. Líneas vacías y comentarios `#` se ignoran.
//! Cada triple termina en `.`.

use gen_core::{arg, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::Value;
use tracing::debug;

use crate::artifacts::{ParsedGraph, Triple};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseTriples;

impl Operation for ParseTriples {
    fn call(&self, _ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let text = arg(args, 0, "text")?.as_str()
                                       .ok_or_else(|| OperationError::invalid("text must be a string"))?;
        let mut triples = Vec::new();
        for (i, line) in text.lines().enumerate() {
            match parse_line(line) {
                Ok(Some(t)) => triples.push(t),
                Ok(None) => {}
                Err(e) => {
                    debug!(line = i + 1, error = %e, "triple rejected");
                    return Ok(OpResult::failure(format!("line {}: {e}", i + 1)));
                }
            }
        }
        debug!(triples = triples.len(), "triples parsed");
        ParsedGraph { count: triples.len(),
                      triples }.into_result()
    }
}

/// Parsea una línea. `Ok(None)` para líneas vacías o comentarios.
pub fn parse_line(line: &str) -> Result<Option<Triple>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let body = trimmed.strip_suffix('.')
                      .ok_or_else(|| "missing terminating '.'".to_string())?;
    let mut rest = body;
    let mut terms = Vec::with_capacity(3);
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (term, tail) = next_term(rest)?;
        terms.push(term);
        rest = tail;
    }
    let [subject, predicate, object]: [Term; 3] =
        terms.try_into()
             .map_err(|t: Vec<Term>| format!("expected 3 terms, found {}", t.len()))?;
    if subject.kind == TermKind::Literal {
        return Err("subject cannot be a literal".into());
    }
    if !matches!(predicate.kind, TermKind::Iri | TermKind::Prefixed) {
        return Err("predicate must be an IRI or prefixed name".into());
    }
    Ok(Some(Triple { subject: subject.text,
                     predicate: predicate.text,
                     object: object.text }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermKind {
    Iri,
    Prefixed,
    Blank,
    Literal,
}

#[derive(Debug)]
struct Term {
    kind: TermKind,
    text: String,
}

fn next_term(input: &str) -> Result<(Term, &str), String> {
    if input.starts_with('<') {
        let (iri, tail) = read_iri(input)?;
        return Ok((Term { kind: TermKind::Iri,
                          text: iri.to_string() },
                   tail));
    }
    if input.starts_with('"') {
        return read_literal(input);
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let (word, tail) = input.split_at(end);
    if let Some(label) = word.strip_prefix("_:") {
        if label.is_empty() {
            return Err("empty blank node label".into());
        }
        return Ok((Term { kind: TermKind::Blank,
                          text: word.to_string() },
                   tail));
    }
    match word.split_once(':') {
        Some((prefix, _)) if !prefix.is_empty() => Ok((Term { kind: TermKind::Prefixed,
                                                              text: word.to_string() },
                                                       tail)),
        _ => Err(format!("unrecognized term '{word}'")),
    }
}

fn read_iri(input: &str) -> Result<(&str, &str), String> {
    let end = input.find('>').ok_or_else(|| "unterminated IRI".to_string())?;
    let iri = &input[..=end];
    if iri[1..end].chars().any(char::is_whitespace) {
        return Err(format!("whitespace inside IRI {iri}"));
    }
    Ok((iri, &input[end + 1..]))
}

fn read_literal(input: &str) -> Result<(Term, &str), String> {
    let mut escaped = false;
    let mut close = None;
    for (i, c) in input.char_indices().skip(1) {
        match (escaped, c) {
            (true, _) => escaped = false,
            (false, '\\') => escaped = true,
            (false, '"') => {
                close = Some(i);
                break;
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| "unterminated literal".to_string())?;
    let mut end = close + 1;
    let after = &input[end..];
    if let Some(lang) = after.strip_prefix('@') {
        let len = lang.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                      .unwrap_or(lang.len());
        if len == 0 {
            return Err("empty language tag".into());
        }
        end += 1 + len;
    } else if let Some(datatype) = after.strip_prefix("^^") {
        let len = if datatype.starts_with('<') {
            read_iri(datatype)?.0.len()
        } else {
            datatype.find(char::is_whitespace).unwrap_or(datatype.len())
        };
        if len == 0 {
            return Err("empty datatype".into());
        }
        end += 2 + len;
    }
    let tail = &input[end..];
    if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
        return Err(format!("unexpected text after literal: '{tail}'"));
    }
    Ok((Term { kind: TermKind::Literal,
               text: input[..end].to_string() },
        tail))
}
