//! CSV Data Loader Module
//! Handles incident CSV loading and cleaning using Polars.

use crate::data::model::{YEAR_MAX, YEAR_MIN};
use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Column order of the raw dataset export (no header row).
pub const RAW_COLUMNS: [&str; 9] = [
    "none",
    "year",
    "month",
    "state",
    "city_or_county",
    "n_killed",
    "n_injured",
    "latitude",
    "longitude",
];

/// Columns kept after cleaning, in frame order.
pub const INCIDENT_COLUMNS: [&str; 7] = [
    "year",
    "state",
    "city_or_county",
    "n_killed",
    "n_injured",
    "latitude",
    "longitude",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Unrecognised CSV layout: {0} columns and no incident header")]
    UnexpectedLayout(usize),
    #[error("No data loaded")]
    NoData,
}

/// Loads the incident dataset and keeps it in memory.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load and clean an incident CSV file.
    pub fn load_csv(&mut self, file_path: &str) -> Result<&DataFrame, LoaderError> {
        self.file_path = Some(PathBuf::from(file_path));

        let df = Self::read_incidents(file_path)?;

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read a CSV file into a cleaned incident frame without touching loader state.
    ///
    /// Every field is read as text first so that a header row, a raw export
    /// and a pre-cleaned file can all be told apart before parsing.
    pub fn read_incidents(file_path: &str) -> Result<DataFrame, LoaderError> {
        let raw = LazyCsvReader::new(file_path)
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let df = Self::clean(raw)?;
        tracing::info!(path = file_path, rows = df.height(), "incident data loaded");
        Ok(df)
    }

    /// Turn an all-text frame into the typed incident frame.
    ///
    /// Output columns: `INCIDENT_COLUMNS`
    pub fn clean(raw: DataFrame) -> Result<DataFrame, LoaderError> {
        if raw.height() == 0 {
            return Err(LoaderError::NoData);
        }

        let (positions, skip) = Self::resolve_layout(&raw)?;
        let [year_ca, state_ca, city_ca, killed_ca, injured_ca, lat_ca, lon_ca] = [
            text_column(&raw, positions[0])?,
            text_column(&raw, positions[1])?,
            text_column(&raw, positions[2])?,
            text_column(&raw, positions[3])?,
            text_column(&raw, positions[4])?,
            text_column(&raw, positions[5])?,
            text_column(&raw, positions[6])?,
        ];

        let capacity = raw.height() - skip;
        let mut years: Vec<i32> = Vec::with_capacity(capacity);
        let mut states: Vec<String> = Vec::with_capacity(capacity);
        let mut cities: Vec<String> = Vec::with_capacity(capacity);
        let mut killed: Vec<i64> = Vec::with_capacity(capacity);
        let mut injured: Vec<i64> = Vec::with_capacity(capacity);
        let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(capacity);
        let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(capacity);
        let mut dropped = 0usize;

        for i in skip..raw.height() {
            let (Some(year), Some(state), Some(city)) = (
                year_ca.get(i).and_then(parse_year),
                state_ca.get(i).and_then(non_empty),
                city_ca.get(i).and_then(non_empty),
            ) else {
                dropped += 1;
                continue;
            };

            years.push(year);
            states.push(state.to_string());
            cities.push(city.to_string());
            killed.push(parse_count(killed_ca.get(i)));
            injured.push(parse_count(injured_ca.get(i)));
            latitudes.push(lat_ca.get(i).and_then(|v| parse_coordinate(v, 90.0)));
            longitudes.push(lon_ca.get(i).and_then(|v| parse_coordinate(v, 180.0)));
        }

        if dropped > 0 {
            tracing::debug!(dropped, "skipped rows without a 2013-2018 year, state or city");
        }
        if years.is_empty() {
            return Err(LoaderError::NoData);
        }

        let df = DataFrame::new(vec![
            Column::new("year".into(), years),
            Column::new("state".into(), states),
            Column::new("city_or_county".into(), cities),
            Column::new("n_killed".into(), killed),
            Column::new("n_injured".into(), injured),
            Column::new("latitude".into(), latitudes),
            Column::new("longitude".into(), longitudes),
        ])?;

        Ok(df)
    }

    /// Locate each of `INCIDENT_COLUMNS` and count the leading rows to skip.
    fn resolve_layout(raw: &DataFrame) -> Result<([usize; 7], usize), LoaderError> {
        let header: Vec<String> = raw
            .get_columns()
            .iter()
            .map(|col| {
                col.str()
                    .ok()
                    .and_then(|ca| ca.get(0))
                    .map(|s| s.trim().to_lowercase())
                    .unwrap_or_default()
            })
            .collect();

        let from_header = INCIDENT_COLUMNS.map(|needed| header.iter().position(|h| h == needed));
        if from_header.iter().all(Option::is_some) {
            return Ok((from_header.map(|p| p.unwrap_or_default()), 1));
        }

        let names: &[&str] = match raw.width() {
            9 => &RAW_COLUMNS,
            7 => &INCIDENT_COLUMNS,
            width => return Err(LoaderError::UnexpectedLayout(width)),
        };
        let positions = INCIDENT_COLUMNS
            .map(|needed| names.iter().position(|n| *n == needed).unwrap_or_default());

        Ok((positions, 0))
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

fn text_column(df: &DataFrame, index: usize) -> Result<&StringChunked, LoaderError> {
    let column = df
        .get_columns()
        .get(index)
        .ok_or(LoaderError::UnexpectedLayout(df.width()))?;
    Ok(column.str()?)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Years may be exported as floats ("2013.0"); only 2013-2018 are kept.
fn parse_year(value: &str) -> Option<i32> {
    let v: f64 = value.trim().parse().ok()?;
    (v.fract() == 0.0 && (YEAR_MIN as f64..=YEAR_MAX as f64).contains(&v)).then_some(v as i32)
}

fn parse_count(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0) as i64)
        .unwrap_or(0)
}

fn parse_coordinate(value: &str, limit: f64) -> Option<f64> {
    let v: f64 = value.trim().parse().ok()?;
    (v.is_finite() && v.abs() <= limit).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn path_of(file: &NamedTempFile) -> String {
        file.path().to_string_lossy().to_string()
    }

    #[test]
    fn raw_export_drops_index_and_month() {
        let file = write_csv(
            "0,2013,1,Pennsylvania,Mckeesport,0,4,40.3467,-79.8559\n\
             1,2013,1,California,Hawthorne,1,3,33.909,-118.333\n",
        );

        let df = DataLoader::read_incidents(&path_of(&file)).unwrap();

        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, INCIDENT_COLUMNS.map(String::from).to_vec());
        assert_eq!(df.column("n_injured").unwrap().i64().unwrap().get(0), Some(4));
        assert_eq!(
            df.column("state").unwrap().str().unwrap().get(1),
            Some("California")
        );
    }

    #[test]
    fn header_row_is_detected_and_extra_columns_ignored() {
        let file = write_csv(
            "incident_id,year,state,city_or_county,n_killed,n_injured,latitude,longitude\n\
             9,2015,Ohio,Akron,2,0,41.08,-81.51\n",
        );

        let df = DataLoader::read_incidents(&path_of(&file)).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), INCIDENT_COLUMNS.len());
        assert_eq!(df.column("year").unwrap().i32().unwrap().get(0), Some(2015));
        assert_eq!(df.column("n_killed").unwrap().i64().unwrap().get(0), Some(2));
    }

    #[test]
    fn dirty_rows_are_cleaned_or_dropped() {
        let file = write_csv(
            "2014.0, Ohio , Akron ,,-3,bad,-81.5\n\
             n/a,Ohio,Akron,1,1,41.0,-81.5\n\
             2014,,Akron,1,1,41.0,-81.5\n\
             2016,Ohio,Dayton,1,2,95.0,-84.2\n",
        );

        let df = DataLoader::read_incidents(&path_of(&file)).unwrap();

        assert_eq!(df.height(), 2);
        let states = df.column("state").unwrap().str().unwrap();
        let cities = df.column("city_or_county").unwrap().str().unwrap();
        assert_eq!(states.get(0), Some("Ohio"));
        assert_eq!(cities.get(0), Some("Akron"));
        assert_eq!(df.column("year").unwrap().i32().unwrap().get(0), Some(2014));
        assert_eq!(df.column("n_killed").unwrap().i64().unwrap().get(0), Some(0));
        assert_eq!(df.column("n_injured").unwrap().i64().unwrap().get(0), Some(0));
        let lat = df.column("latitude").unwrap().f64().unwrap();
        assert_eq!(lat.get(0), None);
        // 95 degrees is not a latitude
        assert_eq!(lat.get(1), None);
    }

    #[test]
    fn years_outside_dataset_range_are_dropped() {
        let file = write_csv(
            "2012,Ohio,Akron,1,0,41.0,-81.5
             2013,Ohio,Akron,2,0,41.0,-81.5
             2018.0,Ohio,Akron,3,0,41.0,-81.5
             2019,Ohio,Akron,4,0,41.0,-81.5
",
        );

        let df = DataLoader::read_incidents(&path_of(&file)).unwrap();

        let years: Vec<Option<i32>> = df.column("year").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2013), Some(2018)]);
        assert_eq!(parse_year("2012"), None);
        assert_eq!(parse_year("2016.5"), None);
        assert_eq!(parse_year(" 2016 "), Some(2016));
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let file = write_csv("a,b,c\n1,2,3\n");

        let err = DataLoader::read_incidents(&path_of(&file)).unwrap_err();

        assert!(matches!(err, LoaderError::UnexpectedLayout(3)));
    }

    #[test]
    fn file_without_usable_rows_is_no_data() {
        let file = write_csv(
            "year,state,city_or_county,n_killed,n_injured,latitude,longitude\n\
             ,Ohio,Akron,1,1,41.0,-81.5\n",
        );

        let err = DataLoader::read_incidents(&path_of(&file)).unwrap_err();

        assert!(matches!(err, LoaderError::NoData));
    }

    #[test]
    fn loader_keeps_frame_and_path() {
        let file = write_csv("2013,Texas,Austin,0,1,30.26,-97.74\n");
        let mut loader = DataLoader::new();

        loader.load_csv(&path_of(&file)).unwrap();

        assert_eq!(loader.get_row_count(), 1);
        assert_eq!(loader.get_file_path(), Some(&file.path().to_path_buf()));
        assert!(loader.get_dataframe().is_some());
    }
}
