//! Keyword extraction and keyword relevance scoring

use forma_intent::ComponentDef;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "for", "to", "in", "on", "with", "at", "by", "from",
    "is", "are", "be", "this", "that", "it", "its", "as", "into", "some", "my", "your", "our",
    "please", "make", "add", "create", "use", "show", "display", "want", "need", "should",
    "component", "element", "node", "ui", "thing",
];

/// Semantic type -> words that suggest it
const SEMANTIC_TYPES: &[(&str, &[&str])] = &[
    ("button", &["button", "btn", "cta", "action", "submit", "click", "press"]),
    (
        "input",
        &["input", "field", "textfield", "email", "password", "search", "entry", "textbox"],
    ),
    ("checkbox", &["checkbox", "check", "tick", "agree", "consent"]),
    ("toggle", &["toggle", "switch", "enable", "disable"]),
    ("select", &["select", "dropdown", "picker", "choose", "option"]),
    ("card", &["card", "tile", "panel", "summary"]),
    ("list", &["list", "row", "item", "entry", "feed"]),
    ("navigation", &["nav", "navigation", "menu", "navbar", "tabs", "breadcrumb"]),
    ("icon", &["icon", "glyph", "symbol"]),
    ("avatar", &["avatar", "profile", "user", "photo"]),
    ("badge", &["badge", "tag", "chip", "pill", "status"]),
    ("modal", &["modal", "dialog", "popup", "overlay"]),
    ("link", &["link", "anchor", "hyperlink"]),
];

/// Lower-cased, stop-word-free, deduplicated keywords in first-seen order.
/// camelCase and PascalCase words are split (`EmailInput` -> email, input).
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in split_words(text) {
        if word.len() < 2 || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// The semantic type a component declares, or one inferred from its name
pub fn semantic_type_of(component: &ComponentDef) -> Option<String> {
    if let Some(declared) = component.semantic_type.as_deref().filter(|s| !s.is_empty()) {
        return Some(declared.to_lowercase());
    }
    let name = component.name.to_lowercase();
    SEMANTIC_TYPES
        .iter()
        .find(|(semantic, synonyms)| {
            name.contains(semantic) || synonyms.iter().any(|s| name.contains(s))
        })
        .map(|(semantic, _)| semantic.to_string())
}

fn synonyms_for(semantic_type: &str) -> &'static [&'static str] {
    SEMANTIC_TYPES
        .iter()
        .find(|(name, _)| semantic_type.contains(name))
        .map(|(_, synonyms)| *synonyms)
        .unwrap_or(&[])
}

/// Keyword relevance of one component.
///
/// +10 per keyword in the name, +5 per keyword in the description, +8 once
/// when the declared semantic type matches a keyword, +7 per keyword listed
/// for the (declared or inferred) semantic type. Only a relevant component earns the +2 (described) and
/// +3 (has variants) bonuses.
pub fn score_component(component: &ComponentDef, keywords: &[String]) -> u32 {
    let name = component.name.to_lowercase();
    let description = component
        .description
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let semantic = semantic_type_of(component);
    let synonyms = semantic.as_deref().map(synonyms_for).unwrap_or(&[]);

    let mut score = 0;
    for keyword in keywords {
        if name.contains(keyword.as_str()) {
            score += 10;
        }
        if description.contains(keyword.as_str()) {
            score += 5;
        }
        if synonyms.contains(&keyword.as_str()) {
            score += 7;
        }
    }
    // Only a declared type; an inferred one already came from the name
    let declared = component
        .semantic_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    if let Some(semantic) = declared.as_deref() {
        if keywords
            .iter()
            .any(|k| semantic == k || semantic.contains(k.as_str()))
        {
            score += 8;
        }
    }

    if score > 0 {
        if component.has_meaningful_description() {
            score += 2;
        }
        if component.has_variants() {
            score += 3;
        }
    }
    score
}
