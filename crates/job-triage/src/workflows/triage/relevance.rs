pub const DEFAULT_RELEVANCE_KEYWORDS: [&str; 5] =
    ["frontend", "front-end", "react", "front end", "vue"];

/// Keyword match over posting titles. Only ever used to rank postings, never
/// to hide them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceClassifier {
    keywords: Vec<String>,
}

impl RelevanceClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_relevant(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| title.contains(keyword.as_str()))
    }
}

impl Default for RelevanceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANCE_KEYWORDS)
    }
}
