use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Private Use Area glyphs (ChatGPT citation icons and similar)
static PRIVATE_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{E000}-\x{F8FF}]").unwrap());

/// Bracketed citation markers, e.g. `【4:0†source】`
static BRACKETED_REFS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"【[^】]*】").unwrap());

/// Zero-width and bidi control characters
static ZERO_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{200B}-\x{200F}\x{202A}-\x{202E}\x{2060}-\x{206F}\x{FEFF}]").unwrap()
});

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.:;!?\)])").unwrap());

static EXTRA_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean a text block before it is written into an exported conversation.
///
/// NFKC-normalizes, drops private-use glyphs, citation markers and
/// zero-width characters, then tidies the whitespace those removals leave
/// behind.
pub fn sanitize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text: String = text.nfkc().collect();
    let text = PRIVATE_USE.replace_all(&text, "");
    let text = BRACKETED_REFS.replace_all(&text, "");
    let text = ZERO_WIDTH.replace_all(&text, "");
    let text = MULTI_SPACE.replace_all(&text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = EXTRA_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
