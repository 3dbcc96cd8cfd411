//! Folder routing from the `$folder$ Title` naming convention.

use regex::Regex;
use std::sync::LazyLock;

/// Folder for conversations without a `$folder$` prefix
pub const DEFAULT_FOLDER: &str = "Uncategorized";

static DOLLAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$([A-Za-z0-9 _.-]+)\$\s*(.*)$").unwrap());

static UNSAFE_FOLDER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"|?*\x00/\\]"#).unwrap());

static RUNS_OF_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Where a conversation goes and what it is called there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub folder: String,
    /// Replacement display name; `None` keeps the normalized name
    pub name: Option<String>,
}

/// Split `$folder$ rest` into `(folder, rest)`.
///
/// Both parts are trimmed. An empty rest falls back to the whole trimmed
/// title; a blank folder means there is no prefix.
pub fn parse_dollar_prefix(title: &str) -> Option<(String, String)> {
    let title = title.trim();
    let caps = DOLLAR_PREFIX.captures(title)?;

    let folder = caps.get(1).map_or("", |m| m.as_str()).trim();
    if folder.is_empty() {
        return None;
    }

    let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
    let name = if rest.is_empty() { title } else { rest };
    Some((folder.to_string(), name.to_string()))
}

/// Make a folder name safe to create under the output directory
pub fn sanitize_folder_name(name: &str) -> String {
    let name = UNSAFE_FOLDER_CHARS.replace_all(name.trim(), "_");
    let name = RUNS_OF_WHITESPACE.replace_all(&name, " ");

    // "." and ".." would escape the output directory
    if name.is_empty() || name.chars().all(|c| c == '.') {
        return DEFAULT_FOLDER.to_string();
    }
    name.into_owned()
}

/// Route a conversation by its raw source title
pub fn route(raw_title: &str) -> Route {
    match parse_dollar_prefix(raw_title) {
        Some((folder, name)) => Route {
            folder: sanitize_folder_name(&folder),
            name: Some(name),
        },
        None => Route {
            folder: DEFAULT_FOLDER.to_string(),
            name: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_title() {
        assert_eq!(
            route("$Work$ Quarterly Plan"),
            Route {
                folder: "Work".to_string(),
                name: Some("Quarterly Plan".to_string()),
            }
        );
    }

    #[test]
    fn test_plain_title() {
        assert_eq!(
            route("Quarterly Plan"),
            Route {
                folder: DEFAULT_FOLDER.to_string(),
                name: None,
            }
        );
        assert_eq!(route("").folder, DEFAULT_FOLDER);
    }

    #[test]
    fn test_prefix_only_keeps_whole_title() {
        assert_eq!(
            parse_dollar_prefix("  $Inbox$  "),
            Some(("Inbox".to_string(), "$Inbox$".to_string()))
        );
    }

    #[test]
    fn test_folder_may_contain_spaces_and_dots() {
        assert_eq!(
            parse_dollar_prefix("$ Side  projects v1.2 $Notes"),
            Some(("Side  projects v1.2".to_string(), "Notes".to_string()))
        );
        assert_eq!(route("$ Side  projects v1.2 $Notes").folder, "Side projects v1.2");
    }

    #[test]
    fn test_unsupported_characters_are_not_a_prefix() {
        assert_eq!(parse_dollar_prefix("$Wörk$ Plan"), None);
        assert_eq!(parse_dollar_prefix("$a/b$ Plan"), None);
        assert_eq!(parse_dollar_prefix("Plan $Work$"), None);
    }

    #[test]
    fn test_blank_folder_is_not_a_prefix() {
        assert_eq!(parse_dollar_prefix("$   $ Plan"), None);
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("a<b>c:d\"e|f?g*h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_folder_name("x/y\\z"), "x_y_z");
        assert_eq!(sanitize_folder_name("  spaced   out  "), "spaced out");
        assert_eq!(sanitize_folder_name("   "), DEFAULT_FOLDER);
        assert_eq!(sanitize_folder_name(".."), DEFAULT_FOLDER);
        assert_eq!(sanitize_folder_name("v1.2"), "v1.2");
    }
}
