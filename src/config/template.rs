// src/config/template.rs

//! Launch command templates.
//!
//! Only three placeholders exist: `{name}` (target base name), `{host}` and
//! `{port}` (reference server). Anything else in braces is rejected during
//! validation, so rendering is plain substitution.

use std::sync::LazyLock;

use regex::Regex;

pub const PLACEHOLDERS: [&str; 3] = ["name", "host", "port"];

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub port: u16,
}

pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace("{name}", vars.name)
        .replace("{host}", vars.host)
        .replace("{port}", &vars.port.to_string())
}

/// `{key}` with no nested braces.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"));

/// Names between `{` and `}` that are not known placeholders.
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|key| key.as_str())
        .filter(|key| !PLACEHOLDERS.contains(key))
        .map(str::to_string)
        .collect()
}
