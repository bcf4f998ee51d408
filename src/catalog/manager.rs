use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::repository::SeriesRepository;
use super::series::{Series, SeriesId};

/// Partial update for a stored series. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeriesUpdate {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub season_count: Option<u32>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
}

impl SeriesUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(self, series: &mut Series) {
        if let Some(title) = self.title {
            series.title = title;
        }
        if let Some(genre) = self.genre {
            series.genre = genre;
        }
        if let Some(season_count) = self.season_count {
            series.season_count = season_count;
        }
        if let Some(release_year) = self.release_year {
            series.release_year = release_year;
        }
        if let Some(rating) = self.rating {
            series.rating = rating;
        }
    }
}

/// Aggregates computed over the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_count: usize,
    /// Mean rating rounded to two decimals, `0.0` for an empty catalog.
    pub average_rating: f64,
    /// Genre occurrence counts, ordered by first appearance.
    pub genre_counts: IndexMap<String, usize>,
    /// Highest rated series; the first one wins a tie.
    pub top_rated: Option<Series>,
    pub total_seasons: u64,
}

impl Statistics {
    fn empty() -> Self {
        Self {
            total_count: 0,
            average_rating: 0.0,
            genre_counts: IndexMap::new(),
            top_rated: None,
            total_seasons: 0,
        }
    }
}

/// Service layer over a [`SeriesRepository`].
///
/// The manager does not range-check its inputs; callers run them through
/// [`ValidationBounds`](super::ValidationBounds) first.
#[derive(Debug, Clone, Default)]
pub struct SeriesManager {
    repository: SeriesRepository,
}

impl SeriesManager {
    pub fn new(repository: SeriesRepository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &SeriesRepository {
        &self.repository
    }

    pub fn create(
        &mut self,
        title: impl Into<String>,
        genre: impl Into<String>,
        season_count: u32,
        release_year: i32,
        rating: f64,
    ) -> Series {
        let created = self.repository.save(Series::unsaved(
            title,
            genre,
            season_count,
            release_year,
            rating,
        ));
        info!(id = created.id, title = %created.title, "series created");
        created
    }

    pub fn list(&self) -> Vec<Series> {
        self.repository.find_all()
    }

    pub fn find(&self, id: SeriesId) -> Option<&Series> {
        self.repository.find_by_id(id)
    }

    pub fn search_by_title(&self, title: &str) -> Vec<Series> {
        self.repository.find_by_title_containing(title)
    }

    pub fn search_by_genre(&self, genre: &str) -> Vec<Series> {
        self.repository.find_by_genre_containing(genre)
    }

    /// Applies a partial update and returns whether the series existed.
    pub fn update(&mut self, id: SeriesId, update: SeriesUpdate) -> bool {
        let Some(mut series) = self.repository.find_by_id(id).cloned() else {
            debug!(id, "update of unknown series ignored");
            return false;
        };
        update.apply_to(&mut series);
        self.repository.save(series);
        info!(id, "series updated");
        true
    }

    pub fn delete(&mut self, id: SeriesId) -> bool {
        let removed = self.repository.delete_by_id(id);
        if removed {
            info!(id, "series deleted");
        }
        removed
    }

    pub fn statistics(&self) -> Statistics {
        let series = self.repository.find_all();
        if series.is_empty() {
            return Statistics::empty();
        }

        let total_count = series.len();
        let rating_sum: f64 = series.iter().map(|s| s.rating).sum();
        let average_rating = round_to_hundredths(rating_sum / total_count as f64);

        let mut genre_counts = IndexMap::new();
        for s in &series {
            *genre_counts.entry(s.genre.clone()).or_insert(0) += 1;
        }

        let top_rated = series
            .iter()
            .reduce(|best, s| if s.rating > best.rating { s } else { best })
            .cloned();

        let total_seasons = series.iter().map(|s| u64::from(s.season_count)).sum();

        Statistics {
            total_count,
            average_rating,
            genre_counts,
            top_rated,
            total_seasons,
        }
    }
}

/// Halfway cases go to the even hundredth, so 8.125 becomes 8.12.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(ratings: &[f64]) -> SeriesManager {
        let mut manager = SeriesManager::new(SeriesRepository::new());
        for (i, rating) in ratings.iter().enumerate() {
            manager.create(format!("S{i}"), "Drama", 1, 2000, *rating);
        }
        manager
    }

    #[test]
    fn create_on_seeded_catalog_gets_id_six() {
        let mut manager = SeriesManager::new(SeriesRepository::seeded());
        let created = manager.create("X", "Y", 1, 2000, 7.0);
        assert_eq!(created.id, 6);
        assert_eq!(manager.repository().count(), 11);
    }

    #[test]
    fn update_without_fields_leaves_series_untouched() {
        let mut manager = SeriesManager::new(SeriesRepository::seeded());
        let before = manager.find(3).cloned();

        assert!(manager.update(3, SeriesUpdate::default()));
        assert_eq!(manager.find(3).cloned(), before);
        assert!(!manager.update(99, SeriesUpdate::default()));
    }

    #[test]
    fn update_only_touches_given_fields() {
        let mut manager = SeriesManager::new(SeriesRepository::seeded());
        let update = SeriesUpdate {
            rating: Some(9.9),
            season_count: Some(6),
            ..Default::default()
        };
        assert!(manager.update(1, update));

        let series = manager.find(1).unwrap();
        assert_eq!(series.title, "Breaking Bad");
        assert_eq!(series.genre, "Drama");
        assert_eq!(series.release_year, 2008);
        assert_eq!(series.season_count, 6);
        assert_eq!(series.rating, 9.9);
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let mut manager = SeriesManager::new(SeriesRepository::seeded());
        assert!(manager.delete(2));
        assert!(!manager.delete(2));
        assert!(manager.find(2).is_none());
    }

    #[test]
    fn statistics_of_empty_catalog_are_zeroed() {
        let manager = SeriesManager::new(SeriesRepository::new());
        let stats = manager.statistics();
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.genre_counts.is_empty());
        assert!(stats.top_rated.is_none());
        assert_eq!(stats.total_seasons, 0);
    }

    #[test]
    fn average_rating_is_rounded_to_two_decimals() {
        let stats = manager_with(&[9.5, 8.8, 8.5]).statistics();
        assert_eq!(stats.average_rating, 8.93);
    }

    #[test]
    fn average_rating_rounds_halfway_to_even() {
        assert_eq!(manager_with(&[8.0, 8.25]).statistics().average_rating, 8.12);
        assert_eq!(manager_with(&[8.0, 8.75]).statistics().average_rating, 8.38);
    }

    #[test]
    fn top_rated_prefers_first_on_ties() {
        let stats = manager_with(&[7.0, 9.0, 9.0]).statistics();
        assert_eq!(stats.top_rated.map(|s| s.title), Some("S1".to_string()));
    }

    #[test]
    fn seeded_statistics() {
        let stats = SeriesManager::new(SeriesRepository::seeded()).statistics();
        assert_eq!(stats.total_count, 10);
        assert_eq!(stats.average_rating, 8.75);
        assert_eq!(stats.total_seasons, 52);
        assert_eq!(
            stats.top_rated.as_ref().map(|s| s.title.as_str()),
            Some("Breaking Bad")
        );

        let genres: Vec<_> = stats
            .genre_counts
            .iter()
            .map(|(genre, count)| (genre.as_str(), *count))
            .collect();
        assert_eq!(
            genres,
            vec![
                ("Drama", 2),
                ("Comedia", 2),
                ("Fantasía", 3),
                ("Ciencia Ficción", 2),
                ("Crimen", 1),
            ]
        );
    }
}
