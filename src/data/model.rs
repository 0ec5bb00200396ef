//! Dashboard Data Model
//! Incident records, widget selection and the aggregate shapes charts consume.

/// First year covered by the dataset.
pub const YEAR_MIN: i32 = 2013;
/// Last year covered by the dataset.
pub const YEAR_MAX: i32 = 2018;

/// One gun violence incident.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub year: i32,
    pub state: String,
    pub city_or_county: String,
    pub n_killed: i64,
    pub n_injured: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Current state of the three selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub state: String,
    pub city_or_county: String,
    pub year: i32,
}

impl Selection {
    pub fn new(state: impl Into<String>, city_or_county: impl Into<String>, year: i32) -> Self {
        Self {
            state: state.into(),
            city_or_county: city_or_county.into(),
            year: year.clamp(YEAR_MIN, YEAR_MAX),
        }
    }

    /// A selection is usable once both the state and the city are chosen.
    pub fn is_complete(&self) -> bool {
        !self.state.is_empty() && !self.city_or_county.is_empty()
    }
}

/// Summed casualties for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearTotals {
    pub year: i32,
    pub n_killed: i64,
    pub n_injured: i64,
}

impl YearTotals {
    pub fn value(&self, casualty: Casualty) -> i64 {
        match casualty {
            Casualty::Killed => self.n_killed,
            Casualty::Injured => self.n_injured,
        }
    }
}

/// Which casualty measure a view is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Casualty {
    Killed,
    Injured,
}

impl Casualty {
    /// Backing column in the incident frame.
    pub fn column(self) -> &'static str {
        match self {
            Casualty::Killed => "n_killed",
            Casualty::Injured => "n_injured",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Casualty::Killed => "Killed",
            Casualty::Injured => "Injured",
        }
    }
}

/// Location of a single incident on a casualty map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_clamps_year_into_dataset_range() {
        assert_eq!(Selection::new("Ohio", "Akron", 1999).year, YEAR_MIN);
        assert_eq!(Selection::new("Ohio", "Akron", 2030).year, YEAR_MAX);
        assert_eq!(Selection::new("Ohio", "Akron", 2016).year, 2016);
    }

    #[test]
    fn selection_requires_state_and_city() {
        assert!(!Selection::new("", "Akron", 2015).is_complete());
        assert!(!Selection::new("Ohio", "", 2015).is_complete());
        assert!(Selection::new("Ohio", "Akron", 2015).is_complete());
    }

    #[test]
    fn casualty_maps_to_columns() {
        assert_eq!(Casualty::Killed.column(), "n_killed");
        assert_eq!(Casualty::Injured.column(), "n_injured");
        assert_eq!(Casualty::Injured.label(), "Injured");
    }
}
