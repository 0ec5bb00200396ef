//! Data module - CSV loading, filtering and aggregation

mod loader;
mod model;
mod processor;

pub use loader::DataLoader;
pub use model::{Casualty, IncidentRecord, MapPoint, Selection, YearTotals, YEAR_MAX, YEAR_MIN};
pub use processor::{DataProcessor, ProcessorError};
