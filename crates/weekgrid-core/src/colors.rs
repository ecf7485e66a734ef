/// Ordered task-code → color mapping with one fallback color. Supplied as
/// configuration data (`color.task.<CODE>` keys); the built-in defaults
/// match the palette the planning backend seeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: Vec<(String, String)>,
    fallback: String,
}

pub const FALLBACK_COLOR: &str = "#E0E0E0";

impl ColorTable {
    pub fn new(entries: Vec<(String, String)>, fallback: impl Into<String>) -> Self {
        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    pub fn defaults() -> Self {
        let entries = [
            ("CMH3", "#90EE90"),
            ("CMH9", "#90EE90"),
            ("CMH12", "#FFFFE0"),
            ("CMH5", "#FFFFE0"),
            ("CMH16", "#FFFFE0"),
            ("HOTMAIL", "#FFD700"),
            ("Gmail", "#FFD700"),
            ("Desktop", "#FFA500"),
            ("Webautomat", "#FFA500"),
            ("Night Desktop", "#FFA500"),
            ("Night tool it", "#FFA500"),
            ("congé", "#FFB6C1"),
        ]
        .into_iter()
        .map(|(code, color)| (code.to_string(), color.to_string()))
        .collect();

        Self::new(entries, FALLBACK_COLOR)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, color)| (code.as_str(), color.as_str()))
    }

    /// First entry whose code matches exactly, else the fallback.
    pub fn resolve(&self, code: &str) -> &str {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == code)
            .map(|(_, color)| color.as_str())
            .unwrap_or(&self.fallback)
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::defaults()
    }
}
