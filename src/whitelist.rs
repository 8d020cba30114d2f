//! Whitelist (exception) list loading.
//!
//! The exception source is a plain text file fed in at startup: one domain
//! per line, `#` comments and blank lines ignored. Every entry is lowercased
//! and marked in the tree via [`DomainTree::mark_exception`], so the
//! hierarchies below those names are never indexed.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TrieError};
use crate::tree::{DomainTree, MAX_NAME_LEN};

/// Accepted whitelist entry: dot-delimited labels over the domain alphabet.
static ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Za-z_-]+(\.[0-9A-Za-z_-]+)*$")
        .expect("ENTRY_PATTERN: hardcoded regex is invalid")
});

/// Mark every domain listed in `text` as an exception.
///
/// Returns the number of entries applied. Malformed or oversized lines abort
/// with the offending line number.
pub fn load_exceptions(tree: &mut DomainTree, text: &str) -> Result<usize> {
    let mut applied = 0;

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers

        // Remove comments and trim whitespace
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.len() > MAX_NAME_LEN {
            log::warn!("whitelist line {line_num} is oversized ({} bytes)", line.len());
            return Err(TrieError::WhitelistParse {
                line: line_num,
                message: format!("entry longer than {MAX_NAME_LEN} bytes"),
            });
        }
        if !ENTRY_PATTERN.is_match(line) {
            return Err(TrieError::WhitelistParse {
                line: line_num,
                message: format!("not a domain name: {line}"),
            });
        }

        tree.mark_exception(&line.to_lowercase())?;
        applied += 1;
    }

    log::debug!("whitelist loaded, {applied} entries");
    Ok(applied)
}

/// Load and apply a whitelist file.
pub fn load_exceptions_file(tree: &mut DomainTree, path: impl AsRef<Path>) -> Result<usize> {
    let text = fs::read_to_string(path.as_ref())?;
    load_exceptions(tree, &text)
}
