//! Score command - offline resistance, adjustment and ESG calculation.

use serde_json::json;
use tidewatch::config::ConfigFile;
use tidewatch::emissions::{
    Adjustment, EmissionError, EsgInputs, EsgPolicy, EsgScorer, Resistance,
};

use crate::error::CliError;

/// Arguments for the score command.
#[derive(Debug, Clone, Copy)]
pub struct ScoreArgs {
    pub wind_speed_mps: f64,
    pub wave_height_m: f64,
    pub base_co2_kg: f64,
    pub distance_km: f64,
    pub speed_knots: f64,
    pub acceleration_events: u32,
    pub time_at_sea_hours: f64,
}

/// Run the score command.
///
/// Scores against the `[esg]` policy from the config file.
pub fn run(args: ScoreArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let report = assess(&args, &config.esg)?;

    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::Output(e.into()))?;
    println!("{}", text);
    Ok(())
}

fn assess(args: &ScoreArgs, policy: &EsgPolicy) -> Result<serde_json::Value, EmissionError> {
    let resistance = Resistance::compute(args.wind_speed_mps, args.wave_height_m);
    let adjustment = Adjustment::apply(args.base_co2_kg, resistance.factor)?;

    let inputs = EsgInputs {
        adjusted_co2_kg: adjustment.adjusted_co2_kg,
        distance_km: args.distance_km,
        avg_speed_knots: args.speed_knots,
        acceleration_events: args.acceleration_events,
        time_at_sea_hours: args.time_at_sea_hours,
        storm: resistance.storm,
        rough_sea: resistance.rough_sea,
    };
    let assessment = EsgScorer::new(policy.clone()).score(&inputs);

    Ok(json!({
        "resistance_factor": resistance.factor,
        "storm_flag": resistance.storm,
        "rough_sea_flag": resistance.rough_sea,
        "base_co2": args.base_co2_kg,
        "adjusted_co2": adjustment.adjusted_co2_kg,
        "delta_weather": adjustment.delta_co2_kg,
        "adjusted_speed_factor": adjustment.speed_factor,
        "co2_intensity": inputs.co2_intensity(),
        "esg_score": assessment.score,
        "rating": assessment.rating.as_str(),
        "risk_flags": assessment.risk_flags,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ScoreArgs {
        ScoreArgs {
            wind_speed_mps: 12.0,
            wave_height_m: 2.5,
            base_co2_kg: 450.0,
            distance_km: 300.0,
            speed_knots: 12.0,
            acceleration_events: 0,
            time_at_sea_hours: 24.0,
        }
    }

    #[test]
    fn test_reference_voyage() {
        let report = assess(&args(), &EsgPolicy::default()).unwrap();

        let factor = report["resistance_factor"].as_f64().unwrap();
        let adjusted = report["adjusted_co2"].as_f64().unwrap();
        let delta = report["delta_weather"].as_f64().unwrap();
        assert!((factor - 1.145).abs() < 1e-9);
        assert!((adjusted - 515.25).abs() < 1e-9);
        assert!((delta - 65.25).abs() < 1e-9);
        assert_eq!(report["storm_flag"], false);
    }

    #[test]
    fn test_zero_distance_scores_within_range() {
        let mut stationary = args();
        stationary.distance_km = 0.0;
        stationary.base_co2_kg = 500.0;

        let report = assess(&stationary, &EsgPolicy::default()).unwrap();
        let score = report["esg_score"].as_u64().unwrap();
        assert!(score <= 100);
        let flags = report["risk_flags"].as_array().unwrap();
        assert!(flags.iter().any(|f| f == "High CO2 intensity"));
    }

    #[test]
    fn test_negative_baseline_rejected() {
        let mut bad = args();
        bad.base_co2_kg = -1.0;

        assert!(matches!(
            assess(&bad, &EsgPolicy::default()),
            Err(EmissionError::InvalidBaseline(_))
        ));
    }
}
