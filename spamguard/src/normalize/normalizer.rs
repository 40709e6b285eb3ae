use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::types::NormalizedDocument;
use crate::config::NormalizerConfig;

static SCRIPT_STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>")
        .expect("script/style pattern is valid")
});

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[a-zA-Z][^<>]*>|<![^<>]*>").expect("tag pattern is valid")
});

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#(\d{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([a-zA-Z][a-zA-Z0-9]{1,31}));")
        .expect("entity pattern is valid")
});

static MIME_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:content-[a-z-]+|mime-version|x-[a-z0-9-]+|received|received-spf|return-path|message-id|dkim-signature|domainkey-signature|arc-[a-z-]+|authentication-results|list-[a-z-]+|delivered-to|references|in-reply-to)\s*:",
    )
    .expect("mime header pattern is valid")
});

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*\s*:").expect("header pattern is valid"));

static BOUNDARY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--[A-Za-z0-9'()+_,./:=?-]{6,}\s*$").expect("boundary pattern is valid")
});

static BASE64_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]{60,}={0,2}$").expect("base64 pattern is valid")
});

const ZERO_WIDTH: [char; 6] = [
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

/// Converts raw email text into a [`NormalizedDocument`].
///
/// Normalization is total: every input, however malformed, yields a
/// document. Fragments that cannot be interpreted are dropped.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, raw_text: &str) -> NormalizedDocument {
        if raw_text.trim().is_empty() {
            return NormalizedDocument::default();
        }

        let mut current = if self.config.strip_mime_boilerplate {
            strip_mime_boilerplate(raw_text)
        } else {
            raw_text.to_string()
        };

        if self.config.strip_html {
            current = strip_html(&current);
            current = decode_html_entities(&current);
        }

        let cleaned = remove_invisible(&current).to_lowercase();
        let text = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let tokens = self.tokenize(&text);

        NormalizedDocument::new(text, tokens)
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| {
                let len = s.chars().count();
                len >= self.config.min_token_len && len <= self.config.max_token_len
            })
            .map(str::to_string)
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

/// Drop transport headers, boundary markers and encoded blobs line by line.
///
/// Headers are only recognized in a header block: the lines at the start of
/// the text and the lines right after a boundary marker, up to the first
/// blank or non-header line. Folded continuations of a dropped header are
/// dropped with it.
fn strip_mime_boilerplate(text: &str) -> String {
    let mut kept = Vec::new();
    let mut in_header_block = true;
    let mut in_dropped_header = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if BOUNDARY_LINE.is_match(trimmed) {
            in_header_block = true;
            in_dropped_header = false;
            continue;
        }

        if in_header_block {
            if trimmed.is_empty() {
                in_header_block = false;
            } else if line.starts_with(' ') || line.starts_with('\t') {
                if in_dropped_header {
                    continue;
                }
            } else if HEADER_LINE.is_match(line) {
                in_dropped_header = MIME_HEADER_LINE.is_match(line);
                if in_dropped_header {
                    continue;
                }
            } else {
                in_header_block = false;
            }
            if !in_header_block {
                in_dropped_header = false;
            }
        }

        if BASE64_LINE.is_match(trimmed) {
            continue;
        }

        kept.push(line);
    }

    kept.join("\n")
}

fn strip_html(text: &str) -> String {
    let without_blocks = SCRIPT_STYLE_BLOCK.replace_all(text, " ");
    let without_comments = HTML_COMMENT.replace_all(&without_blocks, " ");
    HTML_TAG.replace_all(&without_comments, " ").into_owned()
}

fn decode_html_entities(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |caps: &Captures| {
            if let Some(decimal) = caps.get(1) {
                return decimal
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default();
            }
            if let Some(hex) = caps.get(2) {
                return u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default();
            }
            match caps.get(3).map(|m| m.as_str()) {
                Some("amp") => "&".to_string(),
                Some("lt") => "<".to_string(),
                Some("gt") => ">".to_string(),
                Some("quot") => "\"".to_string(),
                Some("apos") => "'".to_string(),
                Some("nbsp") => " ".to_string(),
                _ => String::new(),
            }
        })
        .into_owned()
}

/// Control characters become spaces, zero-width characters disappear.
fn remove_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> NormalizedDocument {
        TextNormalizer::default().normalize(text)
    }

    #[test]
    fn test_lowercase_and_collapse_whitespace() {
        let doc = normalize("  Hello\n\n   WORLD \t again ");
        assert_eq!(doc.text, "hello world again");
        assert_eq!(doc.tokens, vec!["hello", "world", "again"]);
    }

    #[test]
    fn test_strip_html_tags() {
        let doc = normalize("Hello <b>World</b>!");
        assert_eq!(doc.text, "hello world !");
        assert_eq!(doc.tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_strip_script_style_and_comments() {
        let doc = normalize("<style>p { color: red }</style><!-- tracking --><p>Buy now</p><script>alert(1)</script>");
        assert_eq!(doc.text, "buy now");
    }

    #[test]
    fn test_less_than_in_prose_is_kept() {
        let doc = normalize("price < 5 dollars");
        assert_eq!(doc.text, "price < 5 dollars");
    }

    #[test]
    fn test_decode_entities() {
        let doc = normalize("Fish &amp; Chips &#36;5&nbsp;now &#x41;B &bogus;");
        assert_eq!(doc.text, "fish & chips $5 now ab");
        assert_eq!(doc.tokens, vec!["fish", "chips", "now", "ab"]);
    }

    #[test]
    fn test_strip_mime_boilerplate() {
        let raw = "Content-Type: text/plain; charset=utf-8\nContent-Transfer-Encoding: 7bit\nSubject: Meeting\n\nSee you at noon";
        let doc = normalize(raw);
        assert_eq!(doc.text, "subject: meeting see you at noon");
    }

    #[test]
    fn test_header_like_body_lines_are_kept() {
        let raw = "X-Mailer: Bulk 3000\nSubject: Checkup\n\nX-ray: results look fine\nReferences: see the attached notes\n  from the clinic\nList-price: 20 dollars";
        let doc = normalize(raw);
        assert_eq!(
            doc.text,
            "subject: checkup x-ray: results look fine references: see the attached notes from the clinic list-price: 20 dollars"
        );
    }

    #[test]
    fn test_part_headers_after_boundary_are_stripped() {
        let raw = "Hello\n--=_Part_1234_5678\nContent-Type: text/plain;\n\tcharset=utf-8\nContent-Transfer-Encoding: 7bit\n\nX-ray: clear\n--=_Part_1234_5678--";
        let doc = normalize(raw);
        assert_eq!(doc.text, "hello x-ray: clear");
    }

    #[test]
    fn test_strip_folded_header_continuation() {
        let raw = "DKIM-Signature: v=1; a=rsa-sha256;\n\tb=abcdefghij;\n h=from:to\nHello there";
        let doc = normalize(raw);
        assert_eq!(doc.text, "hello there");
    }

    #[test]
    fn test_strip_boundaries_and_base64() {
        let blob = "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNkZWZnaGlqa2xtbm9wcXJzdHV2d3h5eg==";
        let raw = format!("--=_Part_1234_5678\nHi team\n{}\n--=_Part_1234_5678--", blob);
        let doc = normalize(&raw);
        assert_eq!(doc.text, "hi team");
    }

    #[test]
    fn test_boilerplate_stage_can_be_disabled() {
        let normalizer = TextNormalizer::new(NormalizerConfig {
            strip_mime_boilerplate: false,
            ..NormalizerConfig::default()
        });
        let doc = normalizer.normalize("X-Mailer: Bulk 3000\nhello");
        assert_eq!(doc.text, "x-mailer: bulk 3000 hello");
    }

    #[test]
    fn test_html_stage_can_be_disabled() {
        let normalizer = TextNormalizer::new(NormalizerConfig {
            strip_html: false,
            ..NormalizerConfig::default()
        });
        let doc = normalizer.normalize("<b>Bold</b>");
        assert_eq!(doc.text, "<b>bold</b>");
        assert_eq!(doc.tokens, vec!["bold"]);
    }

    #[test]
    fn test_control_and_zero_width_characters() {
        let doc = normalize("free\u{0000}money cl\u{200B}ick");
        assert_eq!(doc.text, "free money click");
    }

    #[test]
    fn test_token_length_bounds() {
        let long = "a".repeat(41);
        let doc = normalize(&format!("x ok {} fine", long));
        assert_eq!(doc.tokens, vec!["ok", "fine"]);
    }

    #[test]
    fn test_unicode_tokens() {
        let doc = normalize("Réunion à 10h CAFÉ");
        assert_eq!(doc.tokens, vec!["réunion", "10h", "café"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t  ").is_empty());
        assert_eq!(normalize("").text, "");
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let inputs = [
            "<<<>>> &#99999999; <a href=",
            "&#xD800; &#0; <",
            "--\n--\n\u{FEFF}",
            "<!-- unterminated comment",
        ];
        for input in inputs {
            let doc = normalize(input);
            assert!(doc.tokens.iter().all(|t| !t.is_empty()));
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Congratulations! <i>You</i> won &amp; more";
        assert_eq!(normalize(text), normalize(text));
    }
}
