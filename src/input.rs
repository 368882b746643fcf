//! SQL text acquisition.
//!
//! The inline query wins, then a SQL file, then piped standard input.

use crate::error::{ExecutorError, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const NO_STATEMENT: &str = "未提供 SQL 语句";

/// Returns the SQL text to execute.
///
/// `stdin` is `None` when standard input is an interactive terminal, so an
/// empty interactive session never blocks.
pub fn read_statement(
    query: Option<&str>,
    file: Option<&Path>,
    stdin: Option<&mut dyn Read>,
) -> Result<String> {
    let sql = if let Some(query) = query {
        query.to_string()
    } else if let Some(path) = file {
        if !path.exists() {
            return Err(ExecutorError::input_missing(format!(
                "文件不存在 - {}",
                path.display()
            )));
        }
        debug!("Reading SQL from {}", path.display());
        std::fs::read_to_string(path).map_err(|e| {
            ExecutorError::input_missing(format!("无法读取文件 {}: {}", path.display(), e))
        })?
    } else if let Some(reader) = stdin {
        debug!("Reading SQL from stdin");
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| ExecutorError::input_missing(format!("无法读取标准输入: {e}")))?;
        buf
    } else {
        return Err(ExecutorError::input_missing(NO_STATEMENT));
    };

    if sql.trim().is_empty() {
        return Err(ExecutorError::input_missing(NO_STATEMENT));
    }
    Ok(sql)
}
