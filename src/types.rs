// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only
// are used in one file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// The 50 U.S. states plus the District of Columbia.
///
/// Mortality datasets label states by full name while the presentation layer
/// wants USPS codes, so both label forms parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum State {
    Alabama,
    Alaska,
    Arizona,
    Arkansas,
    California,
    Colorado,
    Connecticut,
    Delaware,
    DistrictOfColumbia,
    Florida,
    Georgia,
    Hawaii,
    Idaho,
    Illinois,
    Indiana,
    Iowa,
    Kansas,
    Kentucky,
    Louisiana,
    Maine,
    Maryland,
    Massachusetts,
    Michigan,
    Minnesota,
    Mississippi,
    Missouri,
    Montana,
    Nebraska,
    Nevada,
    NewHampshire,
    NewJersey,
    NewMexico,
    NewYork,
    NorthCarolina,
    NorthDakota,
    Ohio,
    Oklahoma,
    Oregon,
    Pennsylvania,
    RhodeIsland,
    SouthCarolina,
    SouthDakota,
    Tennessee,
    Texas,
    Utah,
    Vermont,
    Virginia,
    Washington,
    WestVirginia,
    Wisconsin,
    Wyoming,
}

/// (variant, USPS abbreviation, full name) for every tracked jurisdiction.
const STATE_TABLE: [(State, &str, &str); 51] = [
    (State::Alabama, "AL", "Alabama"),
    (State::Alaska, "AK", "Alaska"),
    (State::Arizona, "AZ", "Arizona"),
    (State::Arkansas, "AR", "Arkansas"),
    (State::California, "CA", "California"),
    (State::Colorado, "CO", "Colorado"),
    (State::Connecticut, "CT", "Connecticut"),
    (State::Delaware, "DE", "Delaware"),
    (State::DistrictOfColumbia, "DC", "District of Columbia"),
    (State::Florida, "FL", "Florida"),
    (State::Georgia, "GA", "Georgia"),
    (State::Hawaii, "HI", "Hawaii"),
    (State::Idaho, "ID", "Idaho"),
    (State::Illinois, "IL", "Illinois"),
    (State::Indiana, "IN", "Indiana"),
    (State::Iowa, "IA", "Iowa"),
    (State::Kansas, "KS", "Kansas"),
    (State::Kentucky, "KY", "Kentucky"),
    (State::Louisiana, "LA", "Louisiana"),
    (State::Maine, "ME", "Maine"),
    (State::Maryland, "MD", "Maryland"),
    (State::Massachusetts, "MA", "Massachusetts"),
    (State::Michigan, "MI", "Michigan"),
    (State::Minnesota, "MN", "Minnesota"),
    (State::Mississippi, "MS", "Mississippi"),
    (State::Missouri, "MO", "Missouri"),
    (State::Montana, "MT", "Montana"),
    (State::Nebraska, "NE", "Nebraska"),
    (State::Nevada, "NV", "Nevada"),
    (State::NewHampshire, "NH", "New Hampshire"),
    (State::NewJersey, "NJ", "New Jersey"),
    (State::NewMexico, "NM", "New Mexico"),
    (State::NewYork, "NY", "New York"),
    (State::NorthCarolina, "NC", "North Carolina"),
    (State::NorthDakota, "ND", "North Dakota"),
    (State::Ohio, "OH", "Ohio"),
    (State::Oklahoma, "OK", "Oklahoma"),
    (State::Oregon, "OR", "Oregon"),
    (State::Pennsylvania, "PA", "Pennsylvania"),
    (State::RhodeIsland, "RI", "Rhode Island"),
    (State::SouthCarolina, "SC", "South Carolina"),
    (State::SouthDakota, "SD", "South Dakota"),
    (State::Tennessee, "TN", "Tennessee"),
    (State::Texas, "TX", "Texas"),
    (State::Utah, "UT", "Utah"),
    (State::Vermont, "VT", "Vermont"),
    (State::Virginia, "VA", "Virginia"),
    (State::Washington, "WA", "Washington"),
    (State::WestVirginia, "WV", "West Virginia"),
    (State::Wisconsin, "WI", "Wisconsin"),
    (State::Wyoming, "WY", "Wyoming"),
];

impl State {
    pub const COUNT: usize = STATE_TABLE.len();

    /// USPS two-letter code, e.g. `"CA"`.
    pub fn abbrev(self) -> &'static str {
        STATE_TABLE
            .iter()
            .find(|(s, _, _)| *s == self)
            .map(|(_, abbrev, _)| *abbrev)
            .unwrap_or("??")
    }

    /// Full state name, e.g. `"California"`.
    pub fn name(self) -> &'static str {
        STATE_TABLE
            .iter()
            .find(|(s, _, _)| *s == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("unknown")
    }

    /// Parses either a USPS abbreviation or a full state name.
    pub fn parse_label(label: &str) -> Result<State, String> {
        let trimmed = label.trim();
        for (state, abbrev, name) in STATE_TABLE {
            if trimmed.eq_ignore_ascii_case(abbrev) || trimmed.eq_ignore_ascii_case(name) {
                return Ok(state);
            }
        }
        Err(format!(
            "Unrecognized state label '{trimmed}'. Expected a USPS code (e.g. 'CA') or a full state name."
        ))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Sex stratum of a mortality record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    /// Sex-combined rows (labelled `Both` or `Overall` upstream).
    Both,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Both => "both",
        }
    }

    pub fn parse_label(label: &str) -> Result<Sex, String> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("male") || trimmed.eq_ignore_ascii_case("m") {
            return Ok(Sex::Male);
        }
        if trimmed.eq_ignore_ascii_case("female") || trimmed.eq_ignore_ascii_case("f") {
            return Ok(Sex::Female);
        }
        if trimmed.eq_ignore_ascii_case("both") || trimmed.eq_ignore_ascii_case("overall") {
            return Ok(Sex::Both);
        }
        Err(format!(
            "Unrecognized sex label '{trimmed}'. Expected 'Male', 'Female', 'Both' or 'Overall'."
        ))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five leading causes of death tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cause {
    Cancer,
    HeartDisease,
    Stroke,
    ChronicLowerRespiratory,
    Accidents,
}

impl Cause {
    /// Canonical cause order. `CauseTable` indexing relies on this.
    pub const ALL: [Cause; 5] = [
        Cause::Cancer,
        Cause::HeartDisease,
        Cause::Stroke,
        Cause::ChronicLowerRespiratory,
        Cause::Accidents,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Short machine-friendly name used in output tables and model schemas.
    pub fn short_name(self) -> &'static str {
        match self {
            Cause::Cancer => "cancer",
            Cause::HeartDisease => "heart_disease",
            Cause::Stroke => "stroke",
            Cause::ChronicLowerRespiratory => "lower_resp",
            Cause::Accidents => "accidents",
        }
    }

    /// The CDC WONDER underlying-cause-of-death label this cause aggregates.
    pub fn ucd_label(self) -> &'static str {
        match self {
            Cause::Cancer => "#Malignant neoplasms (C00-C97)",
            Cause::HeartDisease => "#Diseases of heart (I00-I09,I11,I13,I20-I51)",
            Cause::Stroke => "#Cerebrovascular diseases (I60-I69)",
            Cause::ChronicLowerRespiratory => "#Chronic lower respiratory diseases (J40-J47)",
            Cause::Accidents => "#Accidents (unintentional injuries) (V01-X59,Y85-Y86)",
        }
    }

    /// Parses either the short name or the full UCD label. Returns `None` for
    /// causes outside the tracked five; callers filter those rows out rather
    /// than failing.
    pub fn parse_label(label: &str) -> Option<Cause> {
        let trimmed = label.trim();
        Cause::ALL
            .into_iter()
            .find(|c| trimmed.eq_ignore_ascii_case(c.short_name()) || trimmed == c.ucd_label())
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Cause::Cancer => 0,
            Cause::HeartDisease => 1,
            Cause::Stroke => 2,
            Cause::ChronicLowerRespiratory => 3,
            Cause::Accidents => 4,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A dense table holding one value per tracked cause, indexable by `Cause`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CauseTable<T>([T; Cause::COUNT]);

impl<T> CauseTable<T> {
    pub fn from_fn(mut f: impl FnMut(Cause) -> T) -> Self {
        CauseTable(Cause::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cause, &T)> {
        Cause::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> &[T; Cause::COUNT] {
        &self.0
    }
}

impl<T: Copy> CauseTable<T> {
    pub fn filled(value: T) -> Self {
        CauseTable([value; Cause::COUNT])
    }
}

impl CauseTable<f64> {
    /// Sum across all five causes.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl<T> Index<Cause> for CauseTable<T> {
    type Output = T;

    #[inline]
    fn index(&self, cause: Cause) -> &T {
        &self.0[cause.index()]
    }
}

impl<T> IndexMut<Cause> for CauseTable<T> {
    #[inline]
    fn index_mut(&mut self, cause: Cause) -> &mut T {
        &mut self.0[cause.index()]
    }
}

/// One row of the projection dataset: a (state, sex, cause, year) cell with
/// its observed death count, population denominator and the numeric risk-factor
/// covariates the regressor consumes (stored in model schema order).
#[derive(Debug, Clone, PartialEq)]
pub struct StateCauseRecord {
    pub state: State,
    pub sex: Sex,
    pub cause: Cause,
    pub year: i32,
    /// Observed deaths for this cell in the most recent reporting year.
    /// Suppressed counts upstream are coerced to zero at load time.
    pub observed_deaths: f64,
    /// Population denominator for the cell. Always > 0 for retained rows.
    pub population: f64,
    pub covariates: Vec<f64>,
}
