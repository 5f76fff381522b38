//! Configuration validation.
//!
//! Catches what would otherwise surface as a half-working bridge: missing
//! credentials, an unset source channel, zero intervals, and misspelled keys
//! in the config file.

use crate::{env_subst::has_placeholder, schema::CourierConfig};

use {courier_relay::RelayMode, secrecy::ExposeSecret};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "missing", "value"
    pub category: &'static str,
    /// Dotted path, e.g. "telegram.chat_id"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(category: &'static str, path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.to_string(),
            message: message.into(),
        }
    }

    fn warning(category: &'static str, path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.path, self.message)
        }
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Error diagnostics joined into one line, for startup failures.
    #[must_use]
    pub fn error_summary(&self) -> String {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Known sections and their keys.
const SCHEMA: &[(&str, &[&str])] = &[
    ("discord", &["token", "channel_id"]),
    ("telegram", &["token", "chat_id", "api_url"]),
    ("relay", &[
        "mode",
        "flush_interval_secs",
        "periodic_flush",
        "poll_interval_secs",
    ]),
    ("server", &["bind", "port"]),
];

/// Check a loaded config for values the bridge cannot start with.
#[must_use]
pub fn check_config(config: &CourierConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_secret(
        config.discord.token.expose_secret(),
        "discord.token",
        "DISCORD_TOKEN",
        &mut diagnostics,
    );
    check_secret(
        config.telegram.token.expose_secret(),
        "telegram.token",
        "TELEGRAM_TOKEN",
        &mut diagnostics,
    );

    if config.discord.channel_id == 0 {
        diagnostics.push(Diagnostic::error(
            "missing",
            "discord.channel_id",
            "source channel id is required (set DISCORD_CHANNEL_ID)",
        ));
    }

    let chat_id = config.telegram.chat_id.trim();
    if chat_id.is_empty() {
        diagnostics.push(Diagnostic::error(
            "missing",
            "telegram.chat_id",
            "target chat id is required (set TELEGRAM_CHANNEL)",
        ));
    } else if has_placeholder(chat_id) {
        diagnostics.push(Diagnostic::error(
            "missing",
            "telegram.chat_id",
            "chat id references an environment variable that is not set",
        ));
    } else if chat_id.parse::<i64>().is_err() && chat_id.strip_prefix('@').is_none_or(str::is_empty)
    {
        diagnostics.push(Diagnostic::error(
            "value",
            "telegram.chat_id",
            format!("\"{chat_id}\" is neither a numeric id nor an @channelname"),
        ));
    }

    match config.relay.mode {
        RelayMode::Queued if config.relay.periodic_flush && config.relay.flush_interval_secs == 0 => {
            diagnostics.push(Diagnostic::error(
                "value",
                "relay.flush_interval_secs",
                "periodic flush needs an interval greater than zero",
            ));
        },
        RelayMode::Queued if !config.relay.periodic_flush => {
            diagnostics.push(Diagnostic::warning(
                "value",
                "relay.periodic_flush",
                "periodic flush is off; only POST /flush will drain the queue",
            ));
        },
        RelayMode::Poll if config.relay.poll_interval_secs == 0 => {
            diagnostics.push(Diagnostic::error(
                "value",
                "relay.poll_interval_secs",
                "poll interval must be greater than zero",
            ));
        },
        _ => {},
    }

    if config.server.port == 0 {
        diagnostics.push(Diagnostic::warning(
            "value",
            "server.port",
            "port 0 binds a random port",
        ));
    }

    ValidationResult { diagnostics }
}

fn check_secret(value: &str, path: &str, env: &str, diagnostics: &mut Vec<Diagnostic>) {
    if value.trim().is_empty() {
        diagnostics.push(Diagnostic::error(
            "missing",
            path,
            format!("credential is required (set {env})"),
        ));
    } else if has_placeholder(value) {
        diagnostics.push(Diagnostic::error(
            "missing",
            path,
            "credential references an environment variable that is not set",
        ));
    }
}

/// Validate raw TOML: syntax, unknown keys (with suggestions), types.
///
/// Semantic checks are left to [`check_config`], which runs after
/// environment overrides are applied.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::error(
                "syntax",
                "",
                format!("TOML syntax error: {e}"),
            ));
            return ValidationResult { diagnostics };
        },
    };

    if let Some(table) = value.as_table() {
        check_unknown_fields(table, &mut diagnostics);
    }

    if let Err(e) = toml::from_str::<CourierConfig>(toml_str) {
        diagnostics.push(Diagnostic::error(
            "type-error",
            "",
            format!("type error: {e}"),
        ));
    }

    ValidationResult { diagnostics }
}

fn check_unknown_fields(
    table: &toml::map::Map<String, toml::Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let sections: Vec<&str> = SCHEMA.iter().map(|(name, _)| *name).collect();

    for (section, value) in table {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            diagnostics.push(unknown_field(section, section, &sections, true));
            continue;
        };
        let Some(fields) = value.as_table() else {
            continue;
        };
        for key in fields.keys() {
            if !keys.contains(&key.as_str()) {
                diagnostics.push(unknown_field(&format!("{section}.{key}"), key, keys, false));
            }
        }
    }
}

fn unknown_field(path: &str, key: &str, candidates: &[&str], top_level: bool) -> Diagnostic {
    let level = if top_level {
        " at top level"
    } else {
        ""
    };
    let message = match suggest(key, candidates, 3) {
        Some(s) => format!("unknown field{level} (did you mean \"{s}\"?)"),
        None => format!("unknown field{level}"),
    };
    Diagnostic::error("unknown-field", path, message)
}

/// Levenshtein edit distance over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&c| (c, levenshtein(needle, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, secrecy::Secret};

    fn complete() -> CourierConfig {
        let mut cfg = CourierConfig::default();
        cfg.discord.token = Secret::new("discord".into());
        cfg.discord.channel_id = 987_654_321;
        cfg.telegram.token = Secret::new("123:abc".into());
        cfg.telegram.chat_id = "-1001234567890".into();
        cfg
    }

    fn paths(result: &ValidationResult, severity: Severity) -> Vec<&str> {
        result
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.path.as_str())
            .collect()
    }

    #[test]
    fn complete_config_is_valid() {
        let result = check_config(&complete());
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert_eq!(result.count(Severity::Warning), 0);
    }

    #[test]
    fn missing_everything_is_fatal() {
        let result = check_config(&CourierConfig::default());
        assert!(result.has_errors());
        assert_eq!(paths(&result, Severity::Error), vec![
            "discord.token",
            "telegram.token",
            "discord.channel_id",
            "telegram.chat_id",
        ]);
        assert!(result.error_summary().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn unresolved_placeholder_counts_as_missing() {
        let mut cfg = complete();
        cfg.telegram.token = Secret::new("${TELEGRAM_TOKEN}".into());
        assert_eq!(paths(&check_config(&cfg), Severity::Error), vec![
            "telegram.token"
        ]);
    }

    #[rstest]
    #[case("@my_channel", None)]
    #[case("-1001234567890", None)]
    #[case("my_channel", Some("value"))]
    #[case("@", Some("value"))]
    #[case("${TELEGRAM_CHANNEL}", Some("missing"))]
    fn chat_id_shape(#[case] chat_id: &str, #[case] error_category: Option<&str>) {
        let mut cfg = complete();
        cfg.telegram.chat_id = chat_id.into();
        let result = check_config(&cfg);
        let errors: Vec<&str> = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error && d.path == "telegram.chat_id")
            .map(|d| d.category)
            .collect();
        assert_eq!(errors, error_category.into_iter().collect::<Vec<_>>());
        assert_eq!(result.count(Severity::Warning), 0);
    }

    #[test]
    fn unfilled_template_is_fatal() {
        let raw = crate::env_subst::substitute_env_with(
            &crate::template::default_config_template(),
            |_| None,
        );
        let mut cfg: CourierConfig = toml::from_str(&raw).unwrap();
        cfg.discord.token = Secret::new("discord".into());
        cfg.discord.channel_id = 987_654_321;
        cfg.telegram.token = Secret::new("123:abc".into());

        assert_eq!(paths(&check_config(&cfg), Severity::Error), vec![
            "telegram.chat_id"
        ]);
    }

    #[test]
    fn queued_mode_needs_a_flush_interval() {
        let mut cfg = complete();
        cfg.relay.mode = RelayMode::Queued;
        cfg.relay.flush_interval_secs = 0;
        assert_eq!(paths(&check_config(&cfg), Severity::Error), vec![
            "relay.flush_interval_secs"
        ]);

        cfg.relay.periodic_flush = false;
        let result = check_config(&cfg);
        assert!(!result.has_errors());
        assert_eq!(paths(&result, Severity::Warning), vec!["relay.periodic_flush"]);
    }

    #[test]
    fn poll_mode_needs_an_interval() {
        let mut cfg = complete();
        cfg.relay.mode = RelayMode::Poll;
        cfg.relay.poll_interval_secs = 0;
        assert!(check_config(&cfg).has_errors());
    }

    #[test]
    fn misspelled_key_gets_a_suggestion() {
        let result = validate_toml_str("[telegram]\nchat_idd = \"@x\"\n");
        let diag = &result.diagnostics[0];
        assert_eq!(diag.path, "telegram.chat_idd");
        assert!(diag.message.contains("did you mean \"chat_id\""));
    }

    #[test]
    fn unknown_section_is_flagged() {
        let result = validate_toml_str("[dicsord]\ntoken = \"x\"\n");
        assert!(result.has_errors());
        assert!(result.diagnostics[0].message.contains("\"discord\""));
    }

    #[test]
    fn wrong_type_is_flagged() {
        let result = validate_toml_str("[server]\nport = \"eighty\"\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "type-error")
        );
    }

    #[test]
    fn syntax_error_stops_early() {
        let result = validate_toml_str("[server\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("port", "port"), 0);
        assert_eq!(levenshtein("prot", "port"), 2);
        assert_eq!(levenshtein("", "bind"), 4);
    }
}
