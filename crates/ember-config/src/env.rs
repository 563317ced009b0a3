//! Environment placeholder expansion for raw config text

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.VAR }}` with an optional `| default("fallback")` clause
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// Expansion happens before deserialization so config structs stay plain
/// `String`/`SecretString`. A placeholder whose variable is unset is an error
/// unless it carries a `default("...")` clause. Comment lines pass through
/// unchanged so commented-out examples never fail a load.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut missing: Option<String> = None;
    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let expanded = placeholder().replace_all(line, |caps: &Captures<'_>| {
            let var = &caps[1];
            match std::env::var(var) {
                Ok(value) => value,
                Err(_) => match caps.get(2) {
                    Some(default) => {
                        tracing::warn!(var, "environment variable unset, using configured default");
                        default.as_str().to_owned()
                    }
                    None => {
                        missing.get_or_insert_with(|| var.to_owned());
                        String::new()
                    }
                },
            }
        });
        output.push_str(&expanded);
    }

    if let Some(var) = missing {
        return Err(format!("environment variable not found: `{var}`"));
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}
