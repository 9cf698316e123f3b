//! Text normalisation applied before tokenization.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("valid URL pattern"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("valid tag pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip URLs and HTML tags, drop ASCII punctuation, lowercase and
/// collapse whitespace.
pub fn preprocess(text: &str) -> String {
    let text: Cow<'_, str> = URL.replace_all(text, "");
    let text = HTML_TAG.replace_all(&text, "").into_owned();
    let text: String = text
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase();
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
