use tracing::debug;

use super::series::{Series, SeriesId};

/// In-memory owner of the series collection.
///
/// The repository is the only component that hands out ids. Lookups are
/// linear scans over a `Vec` kept in insertion order; that order is stable but
/// carries no meaning beyond "first stored, first listed".
///
/// There is no internal locking. Callers sharing a repository across tasks
/// must wrap it (the web layer keeps its [`SeriesManager`](super::SeriesManager)
/// behind a `RwLock`).
#[derive(Debug, Clone)]
pub struct SeriesRepository {
    series: Vec<Series>,
    next_id: SeriesId,
}

impl Default for SeriesRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesRepository {
    /// Creates an empty repository whose first assigned id is 1.
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            next_id: 1,
        }
    }

    /// Creates a repository pre-loaded with the ten example series.
    ///
    /// The rows carry ids 1 through 10 but the id counter restarts at 6, so the
    /// first series created afterwards receives id 6 alongside the seeded one.
    pub fn seeded() -> Self {
        let series = vec![
            Series::with_id(1, "Breaking Bad", "Drama", 5, 2008, 9.5),
            Series::with_id(2, "The Office", "Comedia", 9, 2005, 8.8),
            Series::with_id(3, "Game of Thrones", "Fantasía", 8, 2011, 8.5),
            Series::with_id(4, "Stranger Things", "Ciencia Ficción", 4, 2016, 8.7),
            Series::with_id(5, "Friends", "Comedia", 10, 1994, 8.9),
            Series::with_id(6, "The Mandalorian", "Fantasía", 2, 2019, 8.7),
            Series::with_id(7, "The Crown", "Drama", 4, 2016, 8.6),
            Series::with_id(8, "Black Mirror", "Ciencia Ficción", 5, 2011, 8.8),
            Series::with_id(9, "Narcos", "Crimen", 3, 2015, 8.8),
            Series::with_id(10, "The Witcher", "Fantasía", 2, 2019, 8.2),
        ];
        Self { series, next_id: 6 }
    }

    /// Stores a series and returns the stored copy.
    ///
    /// A series carrying the unassigned sentinel gets the next id and is
    /// appended. Any other id goes through [`upsert`](Self::upsert).
    pub fn save(&mut self, mut series: Series) -> Series {
        if series.is_unassigned() {
            series.id = self.next_id;
            self.next_id += 1;
            debug!(id = series.id, title = %series.title, "assigned id to new series");
            self.series.push(series.clone());
            series
        } else {
            self.upsert(series)
        }
    }

    /// Replaces the series with the same id in place, or appends it when no
    /// stored series has that id.
    ///
    /// Appending keeps the caller's id as-is and never advances the id
    /// counter, so a later [`save`](Self::save) of a new series may hand out
    /// the same id again.
    pub fn upsert(&mut self, series: Series) -> Series {
        match self.series.iter_mut().find(|s| s.id == series.id) {
            Some(slot) => *slot = series.clone(),
            None => {
                debug!(id = series.id, "upsert of unknown id appends a new row");
                self.series.push(series.clone());
            }
        }
        series
    }

    pub fn find_by_id(&self, id: SeriesId) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    /// Returns an owned copy of every stored series in insertion order.
    pub fn find_all(&self) -> Vec<Series> {
        self.series.clone()
    }

    /// Case-insensitive substring match on the title. An empty needle matches
    /// every series.
    pub fn find_by_title_containing(&self, title: &str) -> Vec<Series> {
        self.filter_containing(title, |s| s.title.as_str())
    }

    /// Case-insensitive substring match on the genre.
    pub fn find_by_genre_containing(&self, genre: &str) -> Vec<Series> {
        self.filter_containing(genre, |s| s.genre.as_str())
    }

    /// Removes the first series with the given id.
    pub fn delete_by_id(&mut self, id: SeriesId) -> bool {
        match self.series.iter().position(|s| s.id == id) {
            Some(index) => {
                self.series.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.series.len()
    }

    pub fn exists_by_id(&self, id: SeriesId) -> bool {
        self.find_by_id(id).is_some()
    }

    fn filter_containing<F>(&self, needle: &str, field: F) -> Vec<Series>
    where
        F: Fn(&Series) -> &str,
    {
        let needle = needle.to_lowercase();
        self.series
            .iter()
            .filter(|s| field(s).to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str) -> Series {
        Series::unsaved(title, "Drama", 1, 2000, 5.0)
    }

    #[test]
    fn save_assigns_increasing_unused_ids() {
        let mut repo = SeriesRepository::new();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| repo.save(sample(t)).id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(repo.count(), 3);
    }

    #[test]
    fn save_with_existing_id_replaces_in_place() {
        let mut repo = SeriesRepository::new();
        repo.save(sample("first"));
        let second = repo.save(sample("second"));
        repo.save(sample("third"));

        let mut renamed = second.clone();
        renamed.title = "renamed".into();
        repo.save(renamed);

        let titles: Vec<_> = repo.find_all().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["first", "renamed", "third"]);
    }

    #[test]
    fn save_with_unknown_id_appends_without_reassigning() {
        let mut repo = SeriesRepository::new();
        let stored = repo.save(Series::with_id(42, "Foreign", "Drama", 1, 2000, 1.0));

        assert_eq!(stored.id, 42);
        assert!(repo.exists_by_id(42));
        // the counter is untouched by the foreign row
        assert_eq!(repo.save(sample("next")).id, 1);
    }

    #[test]
    fn find_by_id_misses_unknown_ids() {
        let repo = SeriesRepository::seeded();
        assert!(repo.find_by_id(0).is_none());
        assert!(repo.find_by_id(11).is_none());
        assert_eq!(repo.find_by_id(9).map(|s| s.title.as_str()), Some("Narcos"));
    }

    #[test]
    fn find_all_returns_an_independent_copy() {
        let repo = SeriesRepository::seeded();
        let mut all = repo.find_all();
        all.clear();
        assert_eq!(repo.count(), 10);
    }

    #[test]
    fn delete_then_find_returns_none() {
        let mut repo = SeriesRepository::seeded();
        assert!(repo.delete_by_id(4));
        assert!(repo.find_by_id(4).is_none());
        assert!(!repo.delete_by_id(4));
        assert_eq!(repo.count(), 9);
    }

    #[test]
    fn empty_title_filter_returns_everything_in_order() {
        let repo = SeriesRepository::seeded();
        assert_eq!(repo.find_by_title_containing(""), repo.find_all());
    }

    #[test]
    fn filters_ignore_case_and_keep_order() {
        let repo = SeriesRepository::seeded();

        let titles: Vec<_> = repo
            .find_by_title_containing("THE")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(titles, vec![2, 6, 7, 10]);

        let fantasy: Vec<_> = repo
            .find_by_genre_containing("fantasía")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(fantasy, vec![3, 6, 10]);
    }

    #[test]
    fn seeded_counter_starts_at_six() {
        let mut repo = SeriesRepository::seeded();
        let created = repo.save(sample("X"));
        assert_eq!(created.id, 6);
        assert_eq!(repo.count(), 11);
        // the seeded row still wins a lookup
        assert_eq!(repo.find_by_id(6).map(|s| s.title.as_str()), Some("The Mandalorian"));
    }
}
