//! `--overwrite` option parsing.
//!
//! Format: `test_a:key1=value1,key2=value2;test_b:key=value`

use std::collections::BTreeMap;

/// Per-test parameter overrides, keyed by test name
pub type Overwrites = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverwriteError {
    #[error(
        "Cannot split test name and parameters by ':' character. \
         Make sure there are no extra whitespaces in --overwrite - {option}"
    )]
    MissingTestSeparator { option: String },

    #[error(
        "Cannot split parameters by '=' character. \
         Make sure there are no extra whitespaces in --overwrite - {option}"
    )]
    MissingValueSeparator { option: String },
}

/// Parse an `--overwrite` value; an empty string yields no overrides
pub fn parse_overwrite(option: &str) -> Result<Overwrites, OverwriteError> {
    let mut overwrites = Overwrites::new();
    if option.is_empty() {
        return Ok(overwrites);
    }

    for segment in option.split(';').filter(|segment| !segment.is_empty()) {
        let (test, params) = segment
            .split_once(':')
            .ok_or_else(|| OverwriteError::MissingTestSeparator { option: option.to_string() })?;

        let entry = overwrites.entry(test.to_string()).or_default();
        for param in params.split(',') {
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| OverwriteError::MissingValueSeparator { option: option.to_string() })?;
            entry.insert(key.to_string(), value.to_string());
        }
    }

    Ok(overwrites)
}
