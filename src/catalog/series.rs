//! The `Series` catalog entity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a series inside a [`SeriesRepository`](super::SeriesRepository).
pub type SeriesId = u32;

/// Id carried by a series that has not been stored yet.
///
/// The repository replaces it with the next free id on [`save`](super::SeriesRepository::save).
pub const UNASSIGNED_ID: SeriesId = 0;

/// A TV series in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub title: String,
    pub genre: String,
    pub season_count: u32,
    pub release_year: i32,
    #[serde(default)]
    pub rating: f64,
}

impl Series {
    /// Builds a series that still carries the [`UNASSIGNED_ID`] sentinel.
    pub fn unsaved(
        title: impl Into<String>,
        genre: impl Into<String>,
        season_count: u32,
        release_year: i32,
        rating: f64,
    ) -> Self {
        Self::with_id(UNASSIGNED_ID, title, genre, season_count, release_year, rating)
    }

    pub fn with_id(
        id: SeriesId,
        title: impl Into<String>,
        genre: impl Into<String>,
        season_count: u32,
        release_year: i32,
        rating: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            genre: genre.into(),
            season_count,
            release_year,
            rating,
        }
    }

    /// Whether the repository still has to assign an id.
    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_ID
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | {} ({}) - {} | {} seasons | Rating: {}/10",
            self.id, self.title, self.release_year, self.genre, self.season_count, self.rating
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsaved_series_carries_sentinel() {
        let series = Series::unsaved("Dark", "Sci-Fi", 3, 2017, 8.7);
        assert!(series.is_unassigned());
        assert_eq!(series.id, UNASSIGNED_ID);
    }

    #[test]
    fn rating_defaults_to_zero_when_missing() {
        let series: Series = serde_json::from_str(
            r#"{"id":3,"title":"Lost","genre":"Drama","season_count":6,"release_year":2004}"#,
        )
        .unwrap();
        assert_eq!(series.rating, 0.0);
    }

    #[test]
    fn display_lists_every_field() {
        let series = Series::with_id(1, "Breaking Bad", "Drama", 5, 2008, 9.5);
        assert_eq!(
            series.to_string(),
            "ID: 1 | Breaking Bad (2008) - Drama | 5 seasons | Rating: 9.5/10"
        );
    }
}
