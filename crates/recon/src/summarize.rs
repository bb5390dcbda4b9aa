use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_MAX_LENGTH: usize = 45;

/// Filler words dropped from product names.
const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "for", "with", "and", "or", "in", "on", "to", "of", "by", "your", "our",
    "all", "new", "best", "great", "perfect", "premium", "quality", "professional", "upgraded",
    "improved", "enhanced", "deluxe", "ultimate", "extra", "super", "mega", "ultra", "max", "pro",
    "plus", "pack", "count", "up", "use", "multi", "high", "performance", "long", "lasting",
    "natural",
];

/// Brand prefixes preserved verbatim at the start of a summary.
const BRAND_PREFIXES: &[&str] = &[
    "amazon basics",
    "amazonbasics",
    "amazon essentials",
    "zippo",
    "tylenol",
    "advil",
    "clorox",
    "dawn",
    "bounty",
    "charmin",
    "tide",
    "glad",
    "ziploc",
    "duracell",
    "energizer",
    "scotch",
    "post-it",
    "sharpie",
    "bic",
    "honest company",
];

static MULTIPLICITY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+of\d+_").unwrap());
static LEADING_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\-,:\|]+").unwrap());
static QUANTITY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+)[\s\-]*(pack|count|ct|pc|pcs|piece|pieces|sheets|wipes|pods|capsules|tablets|gels)\b",
    )
    .unwrap()
});
static LEADING_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)\s*(pack|count|ct|pc|pcs)?\s+").unwrap());
static SEGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\|,]\s*|\s+-\s+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w']").unwrap());
static SIZE_SPEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\w{1,2}$").unwrap());
static DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+x\d+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Shorten a verbose product name for display. Never errors; a name
/// that reduces to nothing falls back to the truncated original.
///
/// "Amazon Basics AAA Batteries, 36 Count" becomes
/// "Amazon Basics AAA Batteries (36)".
pub fn summarize_item_name(item_name: &str, max_length: usize) -> String {
    if item_name.is_empty() {
        return String::new();
    }

    let mut name = item_name.trim().to_string();

    // Multiplicity prefixes like "1of2_" come from the shipment parser.
    name = MULTIPLICITY_PREFIX.replace(&name, "").to_string();

    let mut brand = String::new();
    let name_lower = name.to_lowercase();
    for prefix in BRAND_PREFIXES {
        if name_lower.starts_with(prefix) {
            brand = title_case(&name[..prefix.len()]);
            name = name[prefix.len()..].trim().to_string();
            name = LEADING_SEPARATORS.replace(&name, "").to_string();
            break;
        }
    }

    // Pull "36 Count" / "100 Pack" style phrases out into a suffix.
    let mut qty = String::new();
    if let Some(caps) = QUANTITY_PHRASE.captures(&name) {
        qty = format!("({})", &caps[1]);
        if let Some(m) = caps.get(0) {
            name = format!("{}{}", &name[..m.start()], &name[m.end()..]);
        }
    } else if let Some(caps) = LEADING_QUANTITY.captures(&name) {
        qty = format!("({})", &caps[1]);
        let end = caps.get(0).map_or(0, |m| m.end());
        name = name[end..].to_string();
    }

    // Keep only the first segment: the tail after a comma, pipe, or
    // spaced hyphen is marketing copy.
    let main_segment = SEGMENT_SPLIT
        .split(&name)
        .next()
        .unwrap_or(&name)
        .to_string();

    let mut meaningful: Vec<String> = Vec::new();
    for word in main_segment.split_whitespace() {
        let clean = NON_WORD.replace_all(word, "").to_string();
        let lower = clean.to_lowercase();
        if FILLER_WORDS.contains(&lower.as_str())
            || clean.chars().count() < 2
            || clean.chars().all(|c| c.is_ascii_digit())
            || SIZE_SPEC.is_match(&clean)
            || DIMENSIONS.is_match(&lower)
        {
            continue;
        }
        meaningful.push(clean);
        if meaningful.len() >= 4 {
            break;
        }
    }

    let mut parts: Vec<String> = Vec::new();
    if !brand.is_empty() {
        parts.push(brand);
    }
    if !meaningful.is_empty() {
        parts.push(meaningful.join(" "));
    }
    if !qty.is_empty() {
        parts.push(qty);
    }

    let summary = WHITESPACE
        .replace_all(parts.join(" ").trim(), " ")
        .to_string();

    if summary.is_empty() {
        return truncate_chars(item_name, max_length);
    }

    if summary.chars().count() > max_length {
        let head = truncate_chars(&summary, max_length.saturating_sub(3));
        let cut = head.rfind(' ').unwrap_or(head.len());
        return format!("{}...", &head[..cut]);
    }

    summary
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Capitalize the first letter of each alphabetic run, lowercase the
/// rest ("post-it" -> "Post-It").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
