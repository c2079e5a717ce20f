use std::collections::BTreeSet;

use super::MediaItem;

/// Placeholder genre written by catalog imports when nothing was known
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Attribute values pooled from a user's consumed items across all kinds
///
/// A catalog item is a content match when any one of these hits (OR across
/// all signals).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSignals {
    pub creators: BTreeSet<String>,
    /// Atomic genre tokens, matched as substrings of a candidate's genres
    pub genres: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub languages: BTreeSet<String>,
    pub type_tags: BTreeSet<String>,
}

impl ContentSignals {
    /// Collects signals from the given items
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a MediaItem>) -> Self {
        let mut signals = Self::default();
        for item in items {
            signals.absorb(item);
        }
        signals
    }

    fn absorb(&mut self, item: &MediaItem) {
        if let Some(creator) = non_blank(item.creator()) {
            self.creators.insert(creator.to_string());
        }
        for token in item.genre_tokens() {
            if token != UNKNOWN_GENRE {
                self.genres.insert(token.to_string());
            }
        }
        if let Some(country) = non_blank(item.country()) {
            self.countries.insert(country.to_string());
        }
        if let Some(year) = item.year() {
            self.years.insert(year);
        }
        if let Some(language) = non_blank(item.language()) {
            self.languages.insert(language.to_string());
        }
        if let Some(tag) = non_blank(item.type_tag()) {
            self.type_tags.insert(tag.to_string());
        }
    }

    /// No signal at all, so no query should be built
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
            && self.genres.is_empty()
            && self.countries.is_empty()
            && self.years.is_empty()
            && self.languages.is_empty()
            && self.type_tags.is_empty()
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        let in_set = |set: &BTreeSet<String>, value: Option<&str>| {
            value.is_some_and(|v| set.contains(v))
        };

        in_set(&self.creators, item.creator())
            || item
                .genre_tokens()
                .iter()
                .any(|token| self.genres.iter().any(|signal| token.contains(signal.as_str())))
            || in_set(&self.countries, item.country())
            || item.year().is_some_and(|year| self.years.contains(&year))
            || in_set(&self.languages, item.language())
            || in_set(&self.type_tags, item.type_tag())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
