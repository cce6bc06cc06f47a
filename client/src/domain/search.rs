//! Case-insensitive substring search shared by the directory and request lists.

/// Normalised search needle; blank queries match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(Option<String>);

impl SearchQuery {
    /// Build a query from free-form user input.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_lowercase()))
        }
    }

    /// Whether the query matches every record.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_none()
    }

    /// True when any of `fields` contains the needle, ignoring case.
    #[must_use]
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        let Some(needle) = self.0.as_deref() else {
            return true;
        };
        fields
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
