//! Environment variable interpolation for config files.
//!
//! Supports the following syntax:
//! - `${VAR}` - substitute with env var value, error if unset or empty
//! - `${VAR:-default}` - use default if VAR is unset or empty
//! - `$$` - escape sequence for literal `$`

use regex::Regex;
use std::env;
use std::sync::LazyLock;

/// Matches `$$` or `${VAR}` with an optional `:-default` suffix.
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern")
});

/// Interpolate environment variables in the given text.
///
/// All missing variables are accumulated so the user can see every problem
/// at once instead of fixing them one per run.
pub fn interpolate(input: &str) -> Result<String, Vec<String>> {
    let mut missing = Vec::new();

    let text = VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            if &caps[0] == "$$" {
                return "$".to_string();
            }

            let name = &caps[1];
            match env::var(name) {
                Ok(value) if !value.is_empty() => value,
                _ => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        missing.push(format!("environment variable '{name}' is not set"));
                        String::new()
                    }
                },
            }
        })
        .into_owned();

    if missing.is_empty() {
        Ok(text)
    } else {
        Err(missing)
    }
}
