//! Lexical statement scanning.
//!
//! Works on an upper-cased, comment-stripped copy of the SQL text. There is
//! no grammar here: string literals, nested block comments and comment
//! markers inside literals are not understood.

use regex::Regex;
use std::sync::LazyLock;

use super::StatementKind;

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)--.*$").expect("line comment pattern is valid"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern is valid"));

// Left boundary: start of text, whitespace or `;`. Right: whitespace or end.
static DELETE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s|;)DELETE(\s|$)").expect("delete pattern is valid"));

/// Upper-cases the text and removes `--` and `/* */` comments.
pub fn normalize(sql: &str) -> String {
    let upper = sql.to_uppercase();
    let without_lines = LINE_COMMENT.replace_all(upper.trim(), "");
    BLOCK_COMMENT.replace_all(&without_lines, "").into_owned()
}

/// Returns true if the SQL text contains a standalone DELETE keyword
/// outside of comments, anywhere in the batch.
pub fn is_delete_statement(sql: &str) -> bool {
    DELETE_KEYWORD.is_match(&normalize(sql))
}

/// Returns true if the statement should be treated as returning rows.
///
/// Either the first word is `SELECT`, or the server reported result columns
/// (covers `WITH ... SELECT`, `EXEC` of a row-returning procedure, etc.).
pub fn is_query(sql: &str, has_result_columns: bool) -> bool {
    has_result_columns
        || sql
            .split_whitespace()
            .next()
            .is_some_and(|word| word.to_uppercase() == "SELECT")
}

/// Classifies a statement after execution.
pub fn classify(sql: &str, has_result_columns: bool) -> StatementKind {
    if is_query(sql, has_result_columns) {
        StatementKind::Query
    } else {
        StatementKind::Command
    }
}
