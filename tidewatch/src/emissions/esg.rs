//! Environmental (ESG) scoring.
//!
//! A vessel starts at 100 and loses fixed, independent penalties for each
//! threshold it crosses. Scoring is deterministic so any published score can
//! be reproduced from the record that carries it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk flag for CO₂ intensity above the policy threshold.
pub const FLAG_HIGH_CO2_INTENSITY: &str = "High CO2 intensity";
/// Risk flag for too many acceleration events.
pub const FLAG_EXCESSIVE_ACCELERATION: &str = "Excessive acceleration";
/// Risk flag for average speed above the policy limit.
pub const FLAG_EXCESSIVE_SPEED: &str = "Excessive speed";
/// Risk flag for very long time at sea.
pub const FLAG_LONG_OPERATION: &str = "Long continuous operation";
/// Informational flag raised by storm-force wind.
pub const FLAG_STORM: &str = "Storm conditions";
/// Informational flag raised by rough sea.
pub const FLAG_ROUGH_SEA: &str = "Rough sea";

/// Scoring thresholds and penalties.
#[derive(Debug, Clone, PartialEq)]
pub struct EsgPolicy {
    /// kg CO₂ per km above which the intensity penalty applies.
    pub co2_intensity_threshold: f64,
    pub co2_intensity_penalty: u8,
    /// Acceleration-event count above which the penalty applies.
    pub acceleration_threshold: u32,
    pub acceleration_penalty: u8,
    /// Average speed (knots) above which the penalty applies.
    pub speed_threshold_knots: f64,
    pub speed_penalty: u8,
    /// Hours at sea above which the penalty applies.
    pub long_operation_hours: f64,
    pub long_operation_penalty: u8,
    /// Penalty for storm conditions. Zero keeps the flag informational.
    pub storm_penalty: u8,
    /// Penalty for rough sea. Zero keeps the flag informational.
    pub rough_sea_penalty: u8,
}

impl Default for EsgPolicy {
    fn default() -> Self {
        Self {
            co2_intensity_threshold: 50.0,
            co2_intensity_penalty: 25,
            acceleration_threshold: 20,
            acceleration_penalty: 15,
            speed_threshold_knots: 18.0,
            speed_penalty: 10,
            long_operation_hours: 720.0,
            long_operation_penalty: 10,
            storm_penalty: 0,
            rough_sea_penalty: 0,
        }
    }
}

/// Inputs to a single score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EsgInputs {
    pub adjusted_co2_kg: f64,
    pub distance_km: f64,
    pub avg_speed_knots: f64,
    pub acceleration_events: u32,
    pub time_at_sea_hours: f64,
    pub storm: bool,
    pub rough_sea: bool,
}

impl EsgInputs {
    /// CO₂ per km travelled.
    ///
    /// Emitting without moving is maximally intense; neither moving nor
    /// emitting is zero.
    pub fn co2_intensity(&self) -> f64 {
        if self.distance_km > 0.0 {
            self.adjusted_co2_kg / self.distance_km
        } else if self.adjusted_co2_kg > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Fixed, ordered rating bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    Critical,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl Rating {
    /// All ratings, best first.
    pub const ALL: [Rating; 5] = [
        Rating::Excellent,
        Rating::Good,
        Rating::Moderate,
        Rating::Poor,
        Rating::Critical,
    ];

    /// Maps a score to its band.
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Rating::Excellent,
            70..=89 => Rating::Good,
            50..=69 => Rating::Moderate,
            30..=49 => Rating::Poor,
            _ => Rating::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Moderate => "Moderate",
            Rating::Poor => "Poor",
            Rating::Critical => "Critical",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one vessel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsgAssessment {
    /// 0..=100
    pub score: u8,
    pub rating: Rating,
    /// Operational flags first, then weather flags.
    pub risk_flags: Vec<String>,
}

/// Scores a vessel against a policy.
#[derive(Debug, Clone, Default)]
pub struct EsgScorer {
    policy: EsgPolicy,
}

impl EsgScorer {
    pub fn new(policy: EsgPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EsgPolicy {
        &self.policy
    }

    pub fn score(&self, inputs: &EsgInputs) -> EsgAssessment {
        let p = &self.policy;
        let mut penalty: u32 = 0;
        let mut risk_flags = Vec::new();

        if inputs.co2_intensity() > p.co2_intensity_threshold {
            penalty += u32::from(p.co2_intensity_penalty);
            risk_flags.push(FLAG_HIGH_CO2_INTENSITY.to_string());
        }
        if inputs.acceleration_events > p.acceleration_threshold {
            penalty += u32::from(p.acceleration_penalty);
            risk_flags.push(FLAG_EXCESSIVE_ACCELERATION.to_string());
        }
        if inputs.avg_speed_knots > p.speed_threshold_knots {
            penalty += u32::from(p.speed_penalty);
            risk_flags.push(FLAG_EXCESSIVE_SPEED.to_string());
        }
        if inputs.time_at_sea_hours > p.long_operation_hours {
            penalty += u32::from(p.long_operation_penalty);
            risk_flags.push(FLAG_LONG_OPERATION.to_string());
        }
        if inputs.storm {
            penalty += u32::from(p.storm_penalty);
            risk_flags.push(FLAG_STORM.to_string());
        }
        if inputs.rough_sea {
            penalty += u32::from(p.rough_sea_penalty);
            risk_flags.push(FLAG_ROUGH_SEA.to_string());
        }

        let score = 100u32.saturating_sub(penalty) as u8;

        EsgAssessment {
            score,
            rating: Rating::from_score(score),
            risk_flags,
        }
    }
}

/// Aggregate view over many scored vessels.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSummary {
    /// Mean score rounded to two decimals, 0.0 for an empty fleet.
    pub average_score: f64,
    pub total_vessels: usize,
    pub rating_counts: HashMap<Rating, usize>,
    /// Up to five flags, most frequent first; ties keep first-seen order.
    pub most_common_risks: Vec<String>,
    pub vessels_with_risks: usize,
    pub risk_free_vessels: usize,
}

impl FleetSummary {
    /// Maximum number of flags reported in `most_common_risks`.
    pub const TOP_RISKS: usize = 5;

    pub fn from_assessments<'a, I>(assessments: I) -> Self
    where
        I: IntoIterator<Item = &'a EsgAssessment>,
    {
        let mut total_vessels = 0usize;
        let mut score_sum = 0u64;
        let mut rating_counts: HashMap<Rating, usize> =
            Rating::ALL.iter().map(|r| (*r, 0)).collect();
        let mut flag_counts: Vec<(String, usize)> = Vec::new();
        let mut vessels_with_risks = 0usize;

        for assessment in assessments {
            total_vessels += 1;
            score_sum += u64::from(assessment.score);
            *rating_counts.entry(assessment.rating).or_default() += 1;

            if !assessment.risk_flags.is_empty() {
                vessels_with_risks += 1;
            }
            for flag in &assessment.risk_flags {
                match flag_counts.iter_mut().find(|(f, _)| f == flag) {
                    Some((_, count)) => *count += 1,
                    None => flag_counts.push((flag.clone(), 1)),
                }
            }
        }

        // Stable sort keeps first-seen order for equal counts.
        flag_counts.sort_by(|a, b| b.1.cmp(&a.1));

        let average_score = if total_vessels == 0 {
            0.0
        } else {
            let mean = score_sum as f64 / total_vessels as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            average_score,
            total_vessels,
            rating_counts,
            most_common_risks: flag_counts
                .into_iter()
                .take(Self::TOP_RISKS)
                .map(|(flag, _)| flag)
                .collect(),
            vessels_with_risks,
            risk_free_vessels: total_vessels - vessels_with_risks,
        }
    }

    pub fn count(&self, rating: Rating) -> usize {
        self.rating_counts.get(&rating).copied().unwrap_or(0)
    }
}
