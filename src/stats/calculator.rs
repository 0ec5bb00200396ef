//! Dashboard Calculator Module
//! Builds every chart input for one selection, running independent queries in parallel.

use crate::data::{Casualty, DataProcessor, MapPoint, ProcessorError, Selection, YearTotals};
use polars::prelude::DataFrame;

/// Everything the chart viewer draws for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub selection: Selection,
    pub state_totals: Vec<YearTotals>,
    pub city_totals: Vec<YearTotals>,
    pub killed_points: Vec<MapPoint>,
    pub injured_points: Vec<MapPoint>,
}

impl DashboardData {
    /// Killed/injured for the selected city/county over all years.
    pub fn grand_totals(&self) -> (i64, i64) {
        self.city_totals
            .iter()
            .fold((0, 0), |(k, i), t| (k + t.n_killed, i + t.n_injured))
    }

    /// City/county totals for the selected year (zeros when there were no incidents).
    pub fn selected_year_totals(&self) -> YearTotals {
        self.city_totals
            .iter()
            .find(|t| t.year == self.selection.year)
            .copied()
            .unwrap_or(YearTotals {
                year: self.selection.year,
                ..Default::default()
            })
    }

    pub fn points(&self, casualty: Casualty) -> &[MapPoint] {
        match casualty {
            Casualty::Killed => &self.killed_points,
            Casualty::Injured => &self.injured_points,
        }
    }
}

/// Computes dashboard views from the incident frame.
pub struct DashboardCalculator;

impl DashboardCalculator {
    /// Compute all four views for a selection.
    pub fn compute(df: &DataFrame, selection: &Selection) -> Result<DashboardData, ProcessorError> {
        let ((state_totals, city_totals), (killed_points, injured_points)) = rayon::join(
            || {
                rayon::join(
                    || DataProcessor::yearly_totals_for_state(df, &selection.state),
                    || {
                        DataProcessor::yearly_totals_for_city(
                            df,
                            &selection.state,
                            &selection.city_or_county,
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || DataProcessor::casualty_locations(df, selection, Casualty::Killed),
                    || DataProcessor::casualty_locations(df, selection, Casualty::Injured),
                )
            },
        );

        let data = DashboardData {
            selection: selection.clone(),
            state_totals: state_totals?,
            city_totals: city_totals?,
            killed_points: killed_points?,
            injured_points: injured_points?,
        };

        tracing::debug!(
            state = %selection.state,
            city = %selection.city_or_county,
            year = selection.year,
            killed_points = data.killed_points.len(),
            injured_points = data.injured_points.len(),
            "dashboard computed"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn incidents() -> DataFrame {
        df!(
            "year" => [2013i32, 2014, 2014, 2016],
            "state" => ["Illinois", "Illinois", "Illinois", "Illinois"],
            "city_or_county" => ["Chicago", "Chicago", "Peoria", "Chicago"],
            "n_killed" => [1i64, 0, 3, 2],
            "n_injured" => [2i64, 4, 0, 0],
            "latitude" => [41.88, 41.85, 40.69, 41.9],
            "longitude" => [-87.63, -87.65, -89.59, -87.7]
        )
        .unwrap()
    }

    #[test]
    fn compute_fills_every_view() {
        let selection = Selection::new("Illinois", "Chicago", 2014);

        let data = DashboardCalculator::compute(&incidents(), &selection).unwrap();

        assert_eq!(data.state_totals.len(), 3);
        assert_eq!(data.state_totals[1], YearTotals { year: 2014, n_killed: 3, n_injured: 4 });
        assert_eq!(data.city_totals.len(), 3);
        assert!(data.killed_points.is_empty());
        assert_eq!(data.injured_points.len(), 1);
        assert_eq!(data.points(Casualty::Injured)[0].count, 4);
    }

    #[test]
    fn summary_totals() {
        let selection = Selection::new("Illinois", "Chicago", 2015);

        let data = DashboardCalculator::compute(&incidents(), &selection).unwrap();

        assert_eq!(data.grand_totals(), (3, 6));
        assert_eq!(
            data.selected_year_totals(),
            YearTotals { year: 2015, n_killed: 0, n_injured: 0 }
        );
    }
}
