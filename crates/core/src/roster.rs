//! Parsing of pasted student name lists.

use crate::error::CoreError;

/// Longest student name the `students` table accepts.
pub const MAX_STUDENT_NAME_LEN: usize = 200;

/// Split pasted text into one name per line.
///
/// Lines are trimmed and blank lines dropped. At least one name is required.
pub fn parse_name_list(raw: &str) -> Result<Vec<String>, CoreError> {
    let names: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(CoreError::Validation(
            "Provide at least one student name".to_string(),
        ));
    }

    if let Some(long) = names
        .iter()
        .find(|n| n.chars().count() > MAX_STUDENT_NAME_LEN)
    {
        return Err(CoreError::Validation(format!(
            "Name exceeds {MAX_STUDENT_NAME_LEN} characters: {long}"
        )));
    }

    Ok(names)
}
