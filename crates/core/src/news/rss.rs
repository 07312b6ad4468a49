use crate::news::Headline;
use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    item: Regex,
    title: Regex,
    link: Regex,
    numeric_ref: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                item: Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").ok()?,
                title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").ok()?,
                link: Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").ok()?,
                numeric_ref: Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").ok()?,
            })
        })
        .as_ref()
}

/// First `limit` `<item>` entries with a non-empty title.
pub fn parse_items(xml: &str, limit: usize) -> Vec<Headline> {
    let Some(re) = patterns() else {
        return Vec::new();
    };
    re.item
        .captures_iter(xml)
        .filter_map(|cap| {
            let body = cap.get(1)?.as_str();
            let title = field(re, &re.title, body)?;
            Some(Headline {
                title,
                link: field(re, &re.link, body),
            })
        })
        .take(limit)
        .collect()
}

fn field(patterns: &Patterns, re: &Regex, body: &str) -> Option<String> {
    let raw = re.captures(body)?.get(1)?.as_str();
    let text = decode_entities(&patterns.numeric_ref, strip_cdata(raw.trim()));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn strip_cdata(s: &str) -> &str {
    s.strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(s)
}

/// `&amp;` goes last so escaped references stay literal.
fn decode_entities(numeric_ref: &Regex, s: &str) -> String {
    let named = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    numeric_ref
        .replace_all(&named, |cap: &regex::Captures| {
            let code = match (cap.get(1), cap.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                _ => None,
            };
            match code.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => cap[0].to_string(),
            }
        })
        .replace("&amp;", "&")
}
