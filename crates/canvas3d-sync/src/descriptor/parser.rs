//! Hand-written scanner for database source descriptors.

use std::collections::BTreeMap;

use super::{DatabaseSource, DescriptorError, TableSpec};

const TABLE_TOKEN: &str = "table=";
const SQL_TOKEN: &str = "sql=";
const INLINE_OPEN: &str = "\"(";

/// Parts of the descriptor that follow the table specification.
struct Tail {
    geocolumn: Option<String>,
    filter: Option<String>,
}

pub(super) fn parse(input: &str) -> Result<DatabaseSource, DescriptorError> {
    let (connection, query_segment) = split_connection(input)?;

    let (table, tail) = if let Some(inline) = query_segment.strip_prefix(INLINE_OPEN) {
        let (query, remainder) = split_inline_query(inline)?;
        (TableSpec::Inline(query.to_owned()), parse_tail(remainder)?)
    } else {
        let (spec, remainder) = split_table_spec(query_segment)?;
        let table = spec.replace('"', "");
        if table.trim().is_empty() {
            return Err(DescriptorError::EmptyTable);
        }
        (TableSpec::Named(table), parse_tail(remainder)?)
    };

    Ok(DatabaseSource {
        connection,
        table,
        geocolumn: tail.geocolumn,
        filter: tail.filter,
    })
}

/// Collects `key=value` tokens up to `table=` and returns the text after it.
fn split_connection(input: &str) -> Result<(BTreeMap<String, String>, &str), DescriptorError> {
    let mut connection = BTreeMap::new();
    let mut rest = input.trim_start();
    loop {
        if let Some(query_segment) = rest.strip_prefix(TABLE_TOKEN) {
            return Ok((connection, query_segment));
        }
        if rest.is_empty() {
            return Err(DescriptorError::MissingTable);
        }
        let (token, remainder) = next_token(rest)?;
        if let Some((key, value)) = token.split_once('=') {
            connection.insert(key.to_owned(), unquote(value).to_owned());
        }
        rest = remainder.trim_start();
    }
}

/// Splits off one space-delimited token, keeping quoted spaces inside it.
fn next_token(input: &str) -> Result<(&str, &str), DescriptorError> {
    let mut quote: Option<char> = None;
    for (index, ch) in input.char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == ' ' => return Ok(input.split_at(index)),
            None => {}
        }
    }
    if quote.is_some() {
        Err(DescriptorError::UnbalancedQuotes)
    } else {
        Ok((input, ""))
    }
}

fn unquote(value: &str) -> &str {
    ['\'', '"']
        .iter()
        .find_map(|quote| {
            value
                .strip_prefix(*quote)
                .and_then(|inner| inner.strip_suffix(*quote))
        })
        .unwrap_or(value)
}

/// Finds the parenthesis closing an inline query.
///
/// `input` starts just after `"(`. Parentheses inside single-quoted SQL
/// literals are ignored. Returns the query text and whatever follows the
/// closing `)"`.
fn split_inline_query(input: &str) -> Result<(&str, &str), DescriptorError> {
    let mut depth = 1_usize;
    let mut in_literal = false;
    for (index, ch) in input.char_indices() {
        match ch {
            '\'' => in_literal = !in_literal,
            '(' if !in_literal => depth += 1,
            ')' if !in_literal => {
                depth -= 1;
                if depth == 0 {
                    let (query, closing) = input.split_at(index);
                    let after_paren = closing.get(1..).unwrap_or_default();
                    return after_paren
                        .strip_prefix('"')
                        .map(|remainder| (query, remainder))
                        .ok_or(DescriptorError::UnterminatedInlineQuery);
                }
            }
            _ => {}
        }
    }
    if in_literal {
        Err(DescriptorError::UnbalancedQuotes)
    } else {
        Err(DescriptorError::UnbalancedParentheses)
    }
}

/// Splits the table specification from the geometry column and filter.
fn split_table_spec(input: &str) -> Result<(&str, &str), DescriptorError> {
    let (spec, remainder) = if input.starts_with('"') {
        match input.find("\" ") {
            Some(index) => input.split_at(index + 1),
            None => (input, ""),
        }
    } else {
        input.split_once(' ').unwrap_or((input, ""))
    };
    if !spec.matches('"').count().is_multiple_of(2) {
        return Err(DescriptorError::UnbalancedQuotes);
    }
    Ok((spec, remainder))
}

fn parse_tail(input: &str) -> Result<Tail, DescriptorError> {
    let (column, filter) = input.split_once(SQL_TOKEN).ok_or(DescriptorError::MissingSql)?;
    Ok(Tail {
        geocolumn: geocolumn(column),
        filter: non_empty(filter),
    })
}

fn geocolumn(text: &str) -> Option<String> {
    non_empty(text.trim_matches(|ch: char| ch == '(' || ch == ')' || ch.is_whitespace()))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
