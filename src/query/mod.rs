use serde::Deserialize;

/// Query string of the catalog page: `?parameter=album|song&search=...`.
///
/// Matching is a plain `LIKE '%term%'`, so it inherits the store's collation
/// (ASCII case-insensitive on SQLite) and `%`/`_` in the term act as
/// wildcards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Search {
    pub parameter: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Album(&'a str),
    Song(&'a str),
}

impl Search {
    pub fn new(parameter: &str, search: &str) -> Self {
        Self {
            parameter: Some(parameter.to_string()),
            search: Some(search.to_string()),
        }
    }

    /// `None` when there is nothing to filter by: no term, no parameter, or a
    /// parameter we don't know.
    pub fn target(&self) -> Option<Target<'_>> {
        let term = self.search.as_deref().filter(|term| !term.is_empty())?;
        match self.parameter.as_deref()? {
            "album" => Some(Target::Album(term)),
            "song" => Some(Target::Song(term)),
            _ => None,
        }
    }
}
