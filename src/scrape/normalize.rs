// Display names that don't reduce to op.gg's slug by stripping punctuation
const SLUG_OVERRIDES: [(&str, &str); 3] = [
    ("Nunu & Willump", "nunu"),
    ("Wukong", "monkeyking"),
    ("Renata Glasc", "renata"),
];

/// Map a champion display name to the lowercase slug used in op.gg URLs.
pub fn normalize_champion_name(display_name: &str) -> String {
    if let Some((_, slug)) = SLUG_OVERRIDES.iter().find(|(name, _)| *name == display_name) {
        return slug.to_string();
    }

    display_name
        .chars()
        .filter(|c| !matches!(c, '\'' | '.' | ' '))
        .collect::<String>()
        .to_lowercase()
}
