//! Input validation for catalog forms.
//!
//! The [`SeriesManager`](super::SeriesManager) trusts its arguments, so every
//! value coming from a client is parsed and range-checked here first.

use serde::Deserialize;
use thiserror::Error;

use super::manager::SeriesUpdate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("{field} is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("season count must be at least {min}, got {value}")]
    SeasonCount { value: u32, min: u32 },
    #[error("release year {value} is outside {min}..={max}")]
    YearOutOfRange { value: i32, min: i32, max: i32 },
    #[error("rating {value} is outside {min}..={max}")]
    RatingOutOfRange { value: f64, min: f64, max: f64 },
}

/// Accepted ranges for series attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationBounds {
    pub min_year: i32,
    pub max_year: i32,
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_seasons: u32,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2030,
            min_rating: 0.0,
            max_rating: 10.0,
            min_seasons: 1,
        }
    }
}

impl ValidationBounds {
    pub fn check_title(&self, title: &str) -> Result<(), ValidationError> {
        non_empty("title", title)
    }

    pub fn check_genre(&self, genre: &str) -> Result<(), ValidationError> {
        non_empty("genre", genre)
    }

    pub fn check_seasons(&self, value: u32) -> Result<(), ValidationError> {
        if value < self.min_seasons {
            return Err(ValidationError::SeasonCount {
                value,
                min: self.min_seasons,
            });
        }
        Ok(())
    }

    pub fn check_year(&self, value: i32) -> Result<(), ValidationError> {
        if !(self.min_year..=self.max_year).contains(&value) {
            return Err(ValidationError::YearOutOfRange {
                value,
                min: self.min_year,
                max: self.max_year,
            });
        }
        Ok(())
    }

    pub fn check_rating(&self, value: f64) -> Result<(), ValidationError> {
        if !(self.min_rating..=self.max_rating).contains(&value) {
            return Err(ValidationError::RatingOutOfRange {
                value,
                min: self.min_rating,
                max: self.max_rating,
            });
        }
        Ok(())
    }
}

/// A fully validated series, ready for [`SeriesManager::create`](super::SeriesManager::create).
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeries {
    pub title: String,
    pub genre: String,
    pub season_count: u32,
    pub release_year: i32,
    pub rating: f64,
}

/// Raw form fields for creating a series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesForm {
    pub title: String,
    pub genre: String,
    pub season_count: String,
    pub release_year: String,
    /// Blank means the default rating of `0.0`.
    #[serde(default)]
    pub rating: String,
}

impl SeriesForm {
    pub fn validate(&self, bounds: &ValidationBounds) -> Result<NewSeries, ValidationError> {
        let title = self.title.trim();
        let genre = self.genre.trim();
        bounds.check_title(title)?;
        bounds.check_genre(genre)?;

        let season_count = parse("season_count", &self.season_count)?;
        bounds.check_seasons(season_count)?;
        let release_year = parse("release_year", &self.release_year)?;
        bounds.check_year(release_year)?;
        let rating = match blank_to_none(&self.rating) {
            Some(raw) => parse("rating", raw)?,
            None => 0.0,
        };
        bounds.check_rating(rating)?;

        Ok(NewSeries {
            title: title.to_string(),
            genre: genre.to_string(),
            season_count,
            release_year,
            rating,
        })
    }
}

/// Raw form fields for a partial update; blank fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesUpdateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub season_count: String,
    #[serde(default)]
    pub release_year: String,
    #[serde(default)]
    pub rating: String,
}

impl SeriesUpdateForm {
    pub fn validate(&self, bounds: &ValidationBounds) -> Result<SeriesUpdate, ValidationError> {
        let season_count = blank_to_none(&self.season_count)
            .map(|raw| parse("season_count", raw))
            .transpose()?;
        if let Some(value) = season_count {
            bounds.check_seasons(value)?;
        }

        let release_year = blank_to_none(&self.release_year)
            .map(|raw| parse("release_year", raw))
            .transpose()?;
        if let Some(value) = release_year {
            bounds.check_year(value)?;
        }

        let rating = blank_to_none(&self.rating)
            .map(|raw| parse("rating", raw))
            .transpose()?;
        if let Some(value) = rating {
            bounds.check_rating(value)?;
        }

        Ok(SeriesUpdate {
            title: blank_to_none(&self.title).map(str::to_string),
            genre: blank_to_none(&self.genre).map(str::to_string),
            season_count,
            release_year,
            rating,
        })
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn blank_to_none(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
