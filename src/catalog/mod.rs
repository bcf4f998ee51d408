//! In-memory TV series catalog.
//!
//! [`SeriesRepository`] owns the rows and assigns ids, [`SeriesManager`] is the
//! service layer on top of it and [`ValidationBounds`] checks raw client input
//! before it reaches the manager.

mod manager;
mod repository;
mod series;
mod validation;

pub use manager::{SeriesManager, SeriesUpdate, Statistics};
pub use repository::SeriesRepository;
pub use series::{Series, SeriesId, UNASSIGNED_ID};
pub use validation::{NewSeries, SeriesForm, SeriesUpdateForm, ValidationBounds, ValidationError};
