//! Tweet text canonicalization
//!
//! Derives a canonical form of tweet text used to detect duplicates within an
//! aggregation bucket. Retweet markers, redundant leading tag runs, trailing
//! tags, trailing links and trailing ellipses are removed; whitespace is
//! collapsed to single spaces.
//!
//! The rules are applied by a whitespace tokenizer and two bounded scans (one
//! over the leading tokens, one over the trailing tokens) rather than a
//! single regular expression.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Matches `http` or `https` links anywhere in the text
static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("link pattern is valid"));

/// What to return when canonicalization strips everything
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmptyTextPolicy {
    /// Fall back to the raw text, unmodified
    #[default]
    #[strum(serialize = "original")]
    #[serde(rename = "original")]
    KeepOriginal,
    /// Return an empty canonical text
    #[strum(serialize = "empty")]
    #[serde(rename = "empty")]
    AllowEmpty,
}

/// Configurable text normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Normalizer {
    pub empty_policy: EmptyTextPolicy,
    /// Decode HTML entities (`&amp;` and friends) before canonicalizing
    pub decode_entities: bool,
}

impl Normalizer {
    pub fn new(empty_policy: EmptyTextPolicy, decode_entities: bool) -> Self {
        Self {
            empty_policy,
            decode_entities,
        }
    }

    /// Canonicalize `raw` according to this normalizer's policy
    pub fn canonicalize(&self, raw: &str) -> String {
        let canonical = if self.decode_entities {
            strip_decorations(&decode_html_entities(raw))
        } else {
            strip_decorations(raw)
        };

        if canonical.is_empty() {
            match self.empty_policy {
                EmptyTextPolicy::KeepOriginal => raw.to_string(),
                EmptyTextPolicy::AllowEmpty => canonical,
            }
        } else {
            canonical
        }
    }
}

/// Canonicalize `raw` with the default policy (empty results fall back to `raw`)
pub fn canonicalize(raw: &str) -> String {
    Normalizer::default().canonicalize(raw)
}

/// Returns true if the text contains an `http(s)://` link
pub fn has_links(text: &str) -> bool {
    LINK_REGEX.is_match(text)
}

/// Decode the HTML entities the tweet API escapes
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // `&amp;` last so "&amp;lt;" decodes to "&lt;" and not "<"
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Token classes seen by the scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// `http://` or `https://` link
    Url,
    /// Sigil followed by a non-digit, e.g. `@user`, `#tag`, `$tag`
    Tag,
    /// Sigil followed by a digit, e.g. `$123.12`
    Amount,
    Word,
}

fn is_sigil(c: char) -> bool {
    matches!(c, '@' | '#' | '$')
}

fn classify(token: &str) -> TokenKind {
    if token.starts_with("http://") || token.starts_with("https://") {
        return TokenKind::Url;
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(sigil), Some(next)) if is_sigil(sigil) => {
            if next.is_ascii_digit() {
                TokenKind::Amount
            } else {
                TokenKind::Tag
            }
        }
        _ => TokenKind::Word,
    }
}

/// Length of the strict tag prefix of `token`: sigil, ASCII letter, then
/// letters, digits or underscores. Zero when the token does not start with a tag.
fn tag_prefix_len(token: &str) -> usize {
    let bytes = token.as_bytes();
    if bytes.len() < 2 || !is_sigil(bytes[0] as char) || !bytes[1].is_ascii_alphabetic() {
        return 0;
    }
    2 + bytes[2..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// Remove a trailing ellipsis (two or more dots, or `…`)
fn strip_ellipsis(token: &str) -> &str {
    let mut end = token.len();
    loop {
        let rest = &token[..end];
        if let Some(stripped) = rest.strip_suffix('…') {
            end = stripped.len();
            continue;
        }
        let dots = rest.bytes().rev().take_while(|b| *b == b'.').count();
        if dots >= 2 {
            end -= dots;
            continue;
        }
        return rest;
    }
}

/// Drop the retweet marker and the leading tag run.
///
/// A tag run closed by a colon is dropped along with the colon. A run of two
/// or more tags without a colon is reduced to its last tag.
fn scan_leading<'a>(raw: &str, tokens: &mut Vec<&'a str>) {
    if tokens.first() == Some(&"RT") && tokens.len() > 1 {
        tokens.remove(0);
    } else if tokens.first() == Some(&"RT") {
        // "RT" needs trailing whitespace to count as a marker
        let after = raw.trim_start().strip_prefix("RT").unwrap_or_default();
        if after.starts_with(char::is_whitespace) {
            tokens.remove(0);
        }
    }

    let mut run = 0;
    while run < tokens.len() {
        let token = tokens[run];
        let tag_len = tag_prefix_len(token);

        if tag_len == 0 {
            match token.strip_prefix(':') {
                Some(rest) if run > 0 => {
                    // Detached colon closing the tag run, possibly glued to the next word
                    tokens.drain(..run);
                    if rest.is_empty() {
                        tokens.remove(0);
                    } else {
                        tokens[0] = rest;
                    }
                    return;
                }
                _ => break,
            }
        }
        if tag_len == token.len() {
            run += 1;
            continue;
        }
        if let Some(rest) = token[tag_len..].strip_prefix(':') {
            // Tag run closed by an attached colon: keep what follows it
            tokens.drain(..run);
            if rest.is_empty() {
                tokens.remove(0);
            } else {
                tokens[0] = rest;
            }
            return;
        }
        break;
    }

    if run >= 2 {
        tokens.drain(..run - 1);
    }
}

/// Drop trailing links, tags and ellipses. Amount tokens are kept without
/// ending the scan; any other word ends it.
fn scan_trailing(tokens: &mut Vec<&str>) {
    let mut kept_tail = Vec::new();
    while let Some(mut token) = tokens.pop() {
        if kept_tail.is_empty() {
            token = strip_ellipsis(token);
            if token.is_empty() {
                continue;
            }
        }
        match classify(token) {
            TokenKind::Url | TokenKind::Tag => continue,
            TokenKind::Amount => kept_tail.push(token),
            TokenKind::Word => {
                tokens.push(token);
                break;
            }
        }
    }
    tokens.extend(kept_tail.into_iter().rev());
}

/// Apply both scans and rejoin. May return an empty string.
fn strip_decorations(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    scan_leading(raw, &mut tokens);
    scan_trailing(&mut tokens);
    tokens.join(" ")
}
