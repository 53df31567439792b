//! Lightweight inspection of SQL text.
//!
//! Only what the shim needs: the leading keyword, named placeholders, the
//! `RETURNING` keyword and the target table of an `INSERT`/`UPDATE`. Quoted
//! literals are skipped so their contents never look like SQL.

use crate::error::{Result, StoreError};
use crate::params::{Param, Params};

/// Whether a statement yields rows or a change count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    pub(crate) fn of(sql: &str) -> Self {
        match words(sql).first().map(|(_, word)| word.to_ascii_uppercase()) {
            Some(word) if matches!(word.as_str(), "SELECT" | "WITH" | "PRAGMA") => Self::Read,
            _ => Self::Write,
        }
    }
}

/// The two mutation shapes the returning emulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Insert,
    Update,
}

/// Rewrites `$name` placeholders to positional `?` and collects the bound
/// values in order of appearance.
pub(crate) fn bind_named(sql: &str, params: &Params) -> Result<(String, Vec<Param>)> {
    let mut positional = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut chars = sql.char_indices().peekable();
    let mut in_literal = false;

    while let Some((_, ch)) = chars.next() {
        if ch == '\'' {
            in_literal = !in_literal;
            positional.push(ch);
            continue;
        }
        if in_literal || ch != '$' {
            positional.push(ch);
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            positional.push(ch);
            continue;
        }

        let value = params
            .get(&name)
            .ok_or_else(|| StoreError::MissingParameter(name.clone()))?;
        values.push(value.clone());
        positional.push('?');
    }

    Ok((positional, values))
}

/// Returns true if the statement carries a `RETURNING` clause.
pub(crate) fn has_returning(sql: &str) -> bool {
    returning_offset(sql).is_some()
}

/// Removes a trailing `RETURNING ...` clause, if any.
pub(crate) fn strip_returning(sql: &str) -> &str {
    match returning_offset(sql) {
        Some(offset) => sql[..offset].trim_end(),
        None => sql.trim_end().trim_end_matches(';').trim_end(),
    }
}

/// Parses `INSERT [OR ...] INTO <table>` or `UPDATE [OR ...] <table>`.
pub(crate) fn mutation_target(sql: &str) -> Option<(Mutation, String)> {
    let words = words(sql);
    let mut iter = words.iter().map(|(_, word)| *word);
    let first = iter.next()?.to_ascii_uppercase();
    let mutation = match first.as_str() {
        "INSERT" => Mutation::Insert,
        "UPDATE" => Mutation::Update,
        _ => return None,
    };

    let mut next = iter.next()?;
    if next.eq_ignore_ascii_case("OR") {
        iter.next()?;
        next = iter.next()?;
    }
    if mutation == Mutation::Insert {
        if !next.eq_ignore_ascii_case("INTO") {
            return None;
        }
        next = iter.next()?;
    }

    Some((mutation, next.to_string()))
}

fn returning_offset(sql: &str) -> Option<usize> {
    words(sql)
        .into_iter()
        .find(|(_, word)| word.eq_ignore_ascii_case("RETURNING"))
        .map(|(offset, _)| offset)
}

/// Splits SQL into identifier-like words with their byte offsets.
fn words(sql: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    let mut in_literal = false;

    for (idx, ch) in sql.char_indices() {
        if ch == '\'' {
            in_literal = !in_literal;
        }
        let is_word = !in_literal && (ch.is_ascii_alphanumeric() || ch == '_');
        match (is_word, start) {
            (true, None) => start = Some(idx),
            (false, Some(begin)) => {
                words.push((begin, &sql[begin..idx]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push((begin, &sql[begin..]));
    }

    words
}
