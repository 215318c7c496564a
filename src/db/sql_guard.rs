//! Read-only statement guard.
//!
//! A statement passes when, after leading whitespace and comments are skipped,
//! its first keyword is `SELECT` and nothing but whitespace or comments follows
//! its first top-level `;`.

use super::dao::{StoreError, StoreResult};

const ALLOWED_KEYWORD: &str = "SELECT";

/// Returns the trimmed statement when it is a single `SELECT`.
pub fn ensure_read_only(sql: &str) -> StoreResult<&str> {
    let trimmed = sql.trim();
    let body = skip_trivia(trimmed).map_err(StoreError::not_read_only)?;
    if body.is_empty() {
        return Err(StoreError::not_read_only("statement is empty"));
    }

    let keyword = leading_keyword(body);
    if !keyword.eq_ignore_ascii_case(ALLOWED_KEYWORD) {
        let shown = if keyword.is_empty() {
            body.chars().take(12).collect::<String>()
        } else {
            keyword.to_ascii_uppercase()
        };
        return Err(StoreError::not_read_only(format!(
            "statement starts with `{shown}`"
        )));
    }

    if let Some(rest) = after_first_terminator(body).map_err(StoreError::not_read_only)? {
        let rest = skip_trivia(rest).map_err(StoreError::not_read_only)?;
        if !rest.is_empty() {
            return Err(StoreError::not_read_only(
                "multiple statements are not allowed",
            ));
        }
    }

    Ok(trimmed)
}

pub fn is_read_only(sql: &str) -> bool {
    ensure_read_only(sql).is_ok()
}

/// Skips whitespace, `--` line comments and `/* */` block comments.
fn skip_trivia(mut sql: &str) -> Result<&str, &'static str> {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            let Some((_, tail)) = rest.split_once("*/") else {
                return Err("unterminated block comment");
            };
            sql = tail;
        } else {
            return Ok(sql);
        }
    }
}

fn leading_keyword(sql: &str) -> &str {
    let end = sql
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
        .map_or(sql.len(), |(idx, _)| idx);
    &sql[..end]
}

/// Text after the first `;` that is outside quotes and comments, if any.
fn after_first_terminator(sql: &str) -> Result<Option<&str>, &'static str> {
    let bytes = sql.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            quote @ (b'\'' | b'"' | b'`') => {
                idx += 1;
                loop {
                    match bytes.get(idx) {
                        None => return Err("unterminated quoted text"),
                        // A doubled quote is an escaped quote inside the literal.
                        Some(&b) if b == quote && bytes.get(idx + 1) == Some(&quote) => idx += 2,
                        Some(&b) if b == quote => break,
                        Some(_) => idx += 1,
                    }
                }
            }
            b'[' => match sql[idx..].find(']') {
                Some(offset) => idx += offset,
                None => return Err("unterminated bracketed identifier"),
            },
            b'-' if bytes.get(idx + 1) == Some(&b'-') => match sql[idx..].find('\n') {
                Some(offset) => idx += offset,
                None => return Ok(None),
            },
            b'/' if bytes.get(idx + 1) == Some(&b'*') => match sql[idx + 2..].find("*/") {
                Some(offset) => idx += offset + 3,
                None => return Err("unterminated block comment"),
            },
            b';' => return Ok(Some(&sql[idx + 1..])),
            _ => {}
        }
        idx += 1;
    }
    Ok(None)
}
