//! Data Processor Module
//! Selector queries, yearly group-by sums and casualty location filters.

use crate::data::model::{Casualty, IncidentRecord, MapPoint, Selection, YearTotals};
use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Filtering and aggregation over the cleaned incident frame.
pub struct DataProcessor;

impl DataProcessor {
    /// Sorted unique states.
    pub fn states(df: &DataFrame) -> Result<Vec<String>, ProcessorError> {
        Self::sorted_unique(df, "state")
    }

    /// Sorted unique city/county names within one state.
    pub fn cities_in_state(df: &DataFrame, state: &str) -> Result<Vec<String>, ProcessorError> {
        let in_state = df
            .clone()
            .lazy()
            .filter(col("state").eq(lit(state)))
            .select([col("city_or_county")])
            .collect()?;

        Self::sorted_unique(&in_state, "city_or_county")
    }

    /// Killed/injured sums per year for a state.
    pub fn yearly_totals_for_state(
        df: &DataFrame,
        state: &str,
    ) -> Result<Vec<YearTotals>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col("year"), col("state")])
            .agg(Self::casualty_sums())
            .filter(col("state").eq(lit(state)));

        Self::collect_year_totals(grouped)
    }

    /// Killed/injured sums per year for a city/county of a state.
    ///
    /// City names repeat across states, so both keys are matched.
    pub fn yearly_totals_for_city(
        df: &DataFrame,
        state: &str,
        city: &str,
    ) -> Result<Vec<YearTotals>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col("year"), col("state"), col("city_or_county")])
            .agg(Self::casualty_sums())
            .filter(
                col("state")
                    .eq(lit(state))
                    .and(col("city_or_county").eq(lit(city))),
            );

        Self::collect_year_totals(grouped)
    }

    /// Incidents of the selected year/state/city with at least one casualty
    /// of the given kind and a known position.
    pub fn casualty_locations(
        df: &DataFrame,
        selection: &Selection,
        casualty: Casualty,
    ) -> Result<Vec<MapPoint>, ProcessorError> {
        let measure = casualty.column();
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col("year")
                    .eq(lit(selection.year))
                    .and(col("state").eq(lit(selection.state.as_str())))
                    .and(col("city_or_county").eq(lit(selection.city_or_county.as_str())))
                    .and(col(measure).gt(lit(0i64)))
                    .and(col("latitude").is_not_null())
                    .and(col("longitude").is_not_null()),
            )
            .select([col("latitude"), col("longitude"), col(measure)])
            .collect()?;

        let lat = filtered.column("latitude")?.f64()?;
        let lon = filtered.column("longitude")?.f64()?;
        let count = filtered.column(measure)?.i64()?;

        let points = lat
            .into_iter()
            .zip(lon)
            .zip(count)
            .filter_map(|((lat, lon), count)| {
                Some(MapPoint {
                    latitude: lat?,
                    longitude: lon?,
                    count: count?,
                })
            })
            .collect();

        Ok(points)
    }

    /// Materialise every row for the dataset table.
    pub fn records(df: &DataFrame) -> Result<Vec<IncidentRecord>, ProcessorError> {
        let year = df.column("year")?.i32()?;
        let state = df.column("state")?.str()?;
        let city = df.column("city_or_county")?.str()?;
        let killed = df.column("n_killed")?.i64()?;
        let injured = df.column("n_injured")?.i64()?;
        let lat = df.column("latitude")?.f64()?;
        let lon = df.column("longitude")?.f64()?;

        let records = (0..df.height())
            .filter_map(|i| {
                Some(IncidentRecord {
                    year: year.get(i)?,
                    state: state.get(i)?.to_string(),
                    city_or_county: city.get(i)?.to_string(),
                    n_killed: killed.get(i).unwrap_or(0),
                    n_injured: injured.get(i).unwrap_or(0),
                    latitude: lat.get(i),
                    longitude: lon.get(i),
                })
            })
            .collect();

        Ok(records)
    }

    fn casualty_sums() -> [Expr; 2] {
        [
            col("n_killed").sum().cast(DataType::Int64),
            col("n_injured").sum().cast(DataType::Int64),
        ]
    }

    fn collect_year_totals(grouped: LazyFrame) -> Result<Vec<YearTotals>, ProcessorError> {
        let out = grouped
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let year = out.column("year")?.i32()?;
        let killed = out.column("n_killed")?.i64()?;
        let injured = out.column("n_injured")?.i64()?;

        let totals = year
            .into_iter()
            .zip(killed)
            .zip(injured)
            .filter_map(|((year, killed), injured)| {
                Some(YearTotals {
                    year: year?,
                    n_killed: killed.unwrap_or(0),
                    n_injured: injured.unwrap_or(0),
                })
            })
            .collect();

        Ok(totals)
    }

    fn sorted_unique(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let values: BTreeSet<&str> = df.column(column)?.str()?.into_iter().flatten().collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incidents() -> DataFrame {
        df!(
            "year" => [2013i32, 2013, 2014, 2014, 2014, 2015, 2013],
            "state" => ["Ohio", "Ohio", "Ohio", "Ohio", "Texas", "Ohio", "Texas"],
            "city_or_county" => ["Akron", "Dayton", "Akron", "Akron", "Akron", "Dayton", "Austin"],
            "n_killed" => [1i64, 0, 2, 0, 5, 1, 0],
            "n_injured" => [0i64, 3, 1, 2, 0, 0, 1],
            "latitude" => [Some(41.08), Some(39.75), Some(41.09), None, Some(41.1), Some(39.76), Some(30.27)],
            "longitude" => [Some(-81.51), Some(-84.19), Some(-81.52), Some(-81.50), Some(-81.5), Some(-84.2), Some(-97.74)]
        )
        .unwrap()
    }

    #[test]
    fn states_are_sorted_and_unique() {
        assert_eq!(DataProcessor::states(&incidents()).unwrap(), vec!["Ohio", "Texas"]);
    }

    #[test]
    fn cities_cascade_from_state() {
        let df = incidents();

        assert_eq!(
            DataProcessor::cities_in_state(&df, "Ohio").unwrap(),
            vec!["Akron", "Dayton"]
        );
        assert_eq!(
            DataProcessor::cities_in_state(&df, "Texas").unwrap(),
            vec!["Akron", "Austin"]
        );
        assert!(DataProcessor::cities_in_state(&df, "Utah").unwrap().is_empty());
    }

    #[test]
    fn state_totals_sum_per_year_in_order() {
        let totals = DataProcessor::yearly_totals_for_state(&incidents(), "Ohio").unwrap();

        assert_eq!(
            totals,
            vec![
                YearTotals { year: 2013, n_killed: 1, n_injured: 3 },
                YearTotals { year: 2014, n_killed: 2, n_injured: 3 },
                YearTotals { year: 2015, n_killed: 1, n_injured: 0 },
            ]
        );
    }

    #[test]
    fn city_totals_do_not_mix_states() {
        let totals = DataProcessor::yearly_totals_for_city(&incidents(), "Ohio", "Akron").unwrap();

        assert_eq!(
            totals,
            vec![
                YearTotals { year: 2013, n_killed: 1, n_injured: 0 },
                YearTotals { year: 2014, n_killed: 2, n_injured: 3 },
            ]
        );
    }

    #[test]
    fn locations_need_casualties_and_coordinates() {
        let df = incidents();
        let selection = Selection::new("Ohio", "Akron", 2014);

        let killed = DataProcessor::casualty_locations(&df, &selection, Casualty::Killed).unwrap();
        assert_eq!(
            killed,
            vec![MapPoint { latitude: 41.09, longitude: -81.52, count: 2 }]
        );

        // The row with two injured has no latitude
        let injured = DataProcessor::casualty_locations(&df, &selection, Casualty::Injured).unwrap();
        assert_eq!(
            injured,
            vec![MapPoint { latitude: 41.09, longitude: -81.52, count: 1 }]
        );
    }

    #[test]
    fn locations_for_empty_year_are_empty() {
        let selection = Selection::new("Ohio", "Akron", 2018);

        let points =
            DataProcessor::casualty_locations(&incidents(), &selection, Casualty::Killed).unwrap();

        assert!(points.is_empty());
    }

    #[test]
    fn records_keep_missing_coordinates() {
        let records = DataProcessor::records(&incidents()).unwrap();

        assert_eq!(records.len(), 7);
        assert_eq!(records[3].latitude, None);
        assert_eq!(records[3].longitude, Some(-81.50));
        assert_eq!(records[4].state, "Texas");
    }
}
