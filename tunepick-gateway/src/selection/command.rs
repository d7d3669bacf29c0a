use tunepick_core::ScopeMode;

/// Classification of an inbound chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search command; the keyword may be empty
    Search(String),
    /// Bare 1-based ordinal. Values too large for `u64` saturate.
    Ordinal(u64),
    /// Anything else; produces no reply
    Ignore,
}

impl Command {
    /// Classify `text` against the configured search prefixes.
    ///
    /// Prefixes match case-insensitively and must be followed by whitespace
    /// or the end of the message, so `songbird` is not a search for `bird`.
    pub fn parse(text: &str, prefixes: &[String]) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Command::Ignore;
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Command::Ordinal(trimmed.parse().unwrap_or(u64::MAX));
        }

        let mut ordered: Vec<&str> = prefixes
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        ordered.sort_by_key(|p| std::cmp::Reverse(p.len()));

        for prefix in ordered {
            let Some(head) = trimmed.get(..prefix.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(prefix) {
                continue;
            }
            let rest = &trimmed[prefix.len()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Command::Search(rest.trim().to_string());
            }
        }

        Command::Ignore
    }
}

/// Identity a search session is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key for a message from `sender_id` in `group_id`
    /// (`None` for a private conversation).
    pub fn for_message(mode: ScopeMode, sender_id: &str, group_id: Option<&str>) -> Self {
        match (mode, group_id) {
            (ScopeMode::User, Some(group)) => Self(format!("{}/{}", group, sender_id)),
            (ScopeMode::Channel, Some(group)) => Self(group.to_string()),
            (_, None) => Self(format!("private/{}", sender_id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
