//! Team profiles - ratings, shooting percentages, pace, and shot selection.
//!
//! A [`Team`] is immutable for the length of a scenario. Edits go through
//! [`TeamUpdate`], where `None` means "keep the current value".

use serde::{Deserialize, Serialize};

use crate::constants::pace;
use crate::error::ValidationError;
use crate::resolver::ShotLocation;

/// Tolerance when checking that shot-selection weights sum to 1.
const BIAS_SUM_TOLERANCE: f64 = 0.011;

/// Share of field-goal attempts taken from each zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotSelectionBias {
    pub three_point: f64,
    pub mid_range: f64,
    pub inside: f64,
}

impl ShotSelectionBias {
    pub fn sum(&self) -> f64 {
        self.three_point + self.mid_range + self.inside
    }

    /// Pick a field-goal location from a uniform draw in `[0, 1)`.
    ///
    /// Threes are checked first, then mid-range; everything above the
    /// cumulative three + mid-range weight is an inside shot.
    pub fn pick(&self, roll: f64) -> ShotLocation {
        if roll < self.three_point {
            ShotLocation::ThreePoint
        } else if roll < self.three_point + self.mid_range {
            ShotLocation::MidRange
        } else {
            ShotLocation::Inside
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub three_point_percentage: f64,
    pub mid_range_percentage: f64,
    pub inside_percentage: f64,
    pub free_throw_percentage: f64,
    /// 1 (slow) to 10 (fast). Faster teams take shorter possessions.
    pub pace_preference: u8,
    pub shot_selection_bias: ShotSelectionBias,
}

impl Team {
    /// Default home profile used before any scenario is selected.
    pub fn default_home() -> Self {
        Self {
            name: "Home Team".into(),
            offensive_rating: 110.0,
            defensive_rating: 108.0,
            three_point_percentage: 0.36,
            mid_range_percentage: 0.42,
            inside_percentage: 0.62,
            free_throw_percentage: 0.78,
            pace_preference: 6,
            shot_selection_bias: ShotSelectionBias {
                three_point: 0.35,
                mid_range: 0.25,
                inside: 0.4,
            },
        }
    }

    /// Default away profile used before any scenario is selected.
    pub fn default_away() -> Self {
        Self {
            name: "Away Team".into(),
            offensive_rating: 108.0,
            defensive_rating: 110.0,
            three_point_percentage: 0.34,
            mid_range_percentage: 0.40,
            inside_percentage: 0.58,
            free_throw_percentage: 0.76,
            pace_preference: 5,
            shot_selection_bias: ShotSelectionBias {
                three_point: 0.32,
                mid_range: 0.30,
                inside: 0.38,
            },
        }
    }

    /// Raw (unadjusted) make percentage for a location.
    pub fn percentage_for(&self, location: ShotLocation) -> f64 {
        match location {
            ShotLocation::ThreePoint => self.three_point_percentage,
            ShotLocation::MidRange => self.mid_range_percentage,
            ShotLocation::Inside => self.inside_percentage,
            ShotLocation::FreeThrow => self.free_throw_percentage,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let percentages = [
            ("three_point_percentage", self.three_point_percentage),
            ("mid_range_percentage", self.mid_range_percentage),
            ("inside_percentage", self.inside_percentage),
            ("free_throw_percentage", self.free_throw_percentage),
        ];
        for (field, value) in percentages {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::PercentageOutOfRange {
                    team: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        if !(pace::MIN..=pace::MAX).contains(&self.pace_preference) {
            return Err(ValidationError::PaceOutOfRange {
                team: self.name.clone(),
                value: self.pace_preference,
            });
        }

        let bias = &self.shot_selection_bias;
        for (field, value) in [
            ("three_point", bias.three_point),
            ("mid_range", bias.mid_range),
            ("inside", bias.inside),
        ] {
            if value < 0.0 {
                return Err(ValidationError::NegativeBias {
                    team: self.name.clone(),
                    field,
                });
            }
        }
        let sum = bias.sum();
        if (sum - 1.0).abs() > BIAS_SUM_TOLERANCE {
            return Err(ValidationError::BiasNotNormalized {
                team: self.name.clone(),
                sum,
            });
        }

        Ok(())
    }

    /// Apply a partial update, returning the merged team.
    pub fn merged(&self, update: &TeamUpdate) -> Self {
        Self {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            offensive_rating: update.offensive_rating.unwrap_or(self.offensive_rating),
            defensive_rating: update.defensive_rating.unwrap_or(self.defensive_rating),
            three_point_percentage: update
                .three_point_percentage
                .unwrap_or(self.three_point_percentage),
            mid_range_percentage: update
                .mid_range_percentage
                .unwrap_or(self.mid_range_percentage),
            inside_percentage: update.inside_percentage.unwrap_or(self.inside_percentage),
            free_throw_percentage: update
                .free_throw_percentage
                .unwrap_or(self.free_throw_percentage),
            pace_preference: update.pace_preference.unwrap_or(self.pace_preference),
            shot_selection_bias: update
                .shot_selection_bias
                .unwrap_or(self.shot_selection_bias),
        }
    }
}

impl Default for Team {
    fn default() -> Self {
        Self::default_home()
    }
}

/// Partial team edit - `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub offensive_rating: Option<f64>,
    pub defensive_rating: Option<f64>,
    pub three_point_percentage: Option<f64>,
    pub mid_range_percentage: Option<f64>,
    pub inside_percentage: Option<f64>,
    pub free_throw_percentage: Option<f64>,
    pub pace_preference: Option<u8>,
    pub shot_selection_bias: Option<ShotSelectionBias>,
}
