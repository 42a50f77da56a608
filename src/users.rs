//! User list loading.
//!
//! The user file is plain text. Its first line is a header (often a count) and
//! is ignored. Every following line names one author; quotes and commas are
//! stripped so a pasted Python/JSON list such as `'alice',` works as-is.

use crate::error::ConfigError;
use crate::models::UserList;
use std::path::Path;
use tracing::{info, instrument};

/// Read and validate the user list at `path`.
///
/// Fails with [`ConfigError::DuplicateUser`] if an author is listed twice and
/// with [`ConfigError::EmptyUserList`] if no author remains after cleaning.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_user_list(path: &Path) -> Result<UserList, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let users = parse_user_list(&contents)?;
    if users.is_empty() {
        return Err(ConfigError::EmptyUserList {
            path: path.to_path_buf(),
        });
    }

    info!(count = users.len(), "Loaded user list");
    Ok(users)
}

/// Parse the contents of a user file.
pub fn parse_user_list(contents: &str) -> Result<UserList, ConfigError> {
    let users = contents
        .lines()
        .skip(1)
        .map(clean_user)
        .filter(|user| !user.is_empty())
        .collect();
    UserList::new(users)
}

fn clean_user(line: &str) -> String {
    line.replace(['\'', '"', ','], "").trim().to_string()
}
