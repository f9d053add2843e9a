use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid non slug symbols regex"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid separators regex"));

/// Turns a free text title into slug form.
///
/// Non-ASCII characters are dropped, as is every symbol that is not a letter,
/// digit, underscore, hyphen or whitespace. The rest is lowercased and runs of
/// whitespace or hyphens collapse into a single `-`. The result may be empty.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.chars().filter(char::is_ascii).collect();
    let cleaned = NON_SLUG_SYMBOLS.replace_all(&ascii, "");
    let lowered = cleaned.trim().to_lowercase();
    SEPARATORS.replace_all(&lowered, "-").into_owned()
}
