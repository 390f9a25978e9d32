//! Per-snapshot enrichment: weather, baseline CO₂, adjustment, ESG.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::record::{EnrichedRecord, VesselSnapshot, WeatherReport};
use crate::emissions::{
    Adjustment, Co2Predictor, EmissionError, EmissionFeatures, EsgInputs, EsgScorer,
    PredictorError,
};
use crate::weather::{WeatherClient, WeatherGridCache};

/// Why a snapshot produced no record.
#[derive(Debug, Clone, Error)]
pub enum EnrichError {
    /// The baseline predictor failed or timed out; the update is skipped.
    #[error("Baseline CO2 prediction failed: {0}")]
    Prediction(#[from] PredictorError),

    /// The predictor's output could not be adjusted.
    #[error("Emission adjustment failed: {0}")]
    Emission(#[from] EmissionError),
}

/// Turns snapshots into enriched records.
///
/// Holds no per-call state; one instance is shared by every dispatcher lane.
/// Weather trouble degrades to neutral conditions, predictor trouble fails
/// the call.
pub struct EnrichmentPipeline<W, P> {
    cache: Arc<WeatherGridCache<W>>,
    predictor: P,
    scorer: EsgScorer,
    predictor_timeout: Duration,
}

impl<W: WeatherClient, P: Co2Predictor> EnrichmentPipeline<W, P> {
    pub fn new(
        cache: Arc<WeatherGridCache<W>>,
        predictor: P,
        scorer: EsgScorer,
        predictor_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            predictor,
            scorer,
            predictor_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<WeatherGridCache<W>> {
        &self.cache
    }

    pub fn scorer(&self) -> &EsgScorer {
        &self.scorer
    }

    /// Enriches one snapshot.
    ///
    /// The weather lookup and the predictor call run concurrently.
    pub async fn enrich(&self, snapshot: &VesselSnapshot) -> Result<EnrichedRecord, EnrichError> {
        let features = snapshot.features.sanitized();

        let (weather, base_co2) = tokio::join!(
            self.weather_for(snapshot),
            self.predict(&snapshot.mmsi, &features)
        );
        let base_co2 = base_co2?;

        let adjustment = Adjustment::apply(base_co2, weather.resistance_factor)?;
        let assessment = self.scorer.score(&EsgInputs {
            adjusted_co2_kg: adjustment.adjusted_co2_kg,
            distance_km: features.distance_km,
            avg_speed_knots: features.avg_speed_knots,
            acceleration_events: features.acceleration_events,
            time_at_sea_hours: features.time_at_sea_hours,
            storm: weather.storm_flag,
            rough_sea: weather.rough_sea_flag,
        });

        debug!(
            mmsi = %snapshot.mmsi,
            base_co2,
            adjusted_co2 = adjustment.adjusted_co2_kg,
            esg_score = assessment.score,
            "Enriched vessel update"
        );

        Ok(EnrichedRecord::assemble(
            snapshot, weather, base_co2, adjustment, assessment,
        ))
    }

    async fn weather_for(&self, snapshot: &VesselSnapshot) -> WeatherReport {
        match self.cache.get(snapshot.lat, snapshot.lon).await {
            Ok(observation) => WeatherReport::from(observation),
            Err(e) => {
                warn!(
                    mmsi = %snapshot.mmsi,
                    lat = snapshot.lat,
                    lon = snapshot.lon,
                    error = %e,
                    "Weather unavailable, assuming neutral conditions"
                );
                WeatherReport::neutral()
            }
        }
    }

    async fn predict(&self, mmsi: &str, features: &EmissionFeatures) -> Result<f64, PredictorError> {
        let call = self.predictor.predict_base_co2(features);
        match tokio::time::timeout(self.predictor_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let ms = self.predictor_timeout.as_millis() as u64;
                debug!(mmsi, timeout_ms = ms, "Predictor timed out");
                Err(PredictorError::Timeout(ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::{EsgPolicy, Rating};
    use crate::weather::{RawWeather, WeatherCacheConfig, WeatherError};
    use chrono::Utc;

    struct FixedWeather(Option<RawWeather>);

    impl WeatherClient for FixedWeather {
        async fn fetch(&self, _lat: f64, _lon: f64) -> Result<RawWeather, WeatherError> {
            self.0.clone().ok_or(WeatherError::Status(503))
        }
    }

    struct FixedPredictor(Result<f64, PredictorError>);

    impl Co2Predictor for FixedPredictor {
        async fn predict_base_co2(&self, _features: &EmissionFeatures) -> Result<f64, PredictorError> {
            self.0.clone()
        }
    }

    struct StalledPredictor;

    impl Co2Predictor for StalledPredictor {
        async fn predict_base_co2(&self, _features: &EmissionFeatures) -> Result<f64, PredictorError> {
            std::future::pending::<Result<f64, PredictorError>>().await
        }
    }

    fn rough_weather() -> Option<RawWeather> {
        Some(RawWeather {
            wind_speed_mps: 12.0,
            wind_direction_deg: 200.0,
            wave_height_m: Some(2.5),
            temperature_c: 29.0,
            condition: "clouds".to_string(),
        })
    }

    fn pipeline<P: Co2Predictor>(
        weather: Option<RawWeather>,
        predictor: P,
    ) -> EnrichmentPipeline<FixedWeather, P> {
        let cache = Arc::new(WeatherGridCache::new(
            FixedWeather(weather),
            WeatherCacheConfig::default(),
        ));
        EnrichmentPipeline::new(
            cache,
            predictor,
            EsgScorer::new(EsgPolicy::default()),
            Duration::from_secs(1),
        )
    }

    fn snapshot() -> VesselSnapshot {
        VesselSnapshot {
            mmsi: "419001".to_string(),
            lat: 18.9,
            lon: 72.8,
            speed: 12.0,
            timestamp: Utc::now(),
            features: EmissionFeatures::projected_day(12.0, 1.5),
        }
    }

    #[tokio::test]
    async fn test_enrich_applies_resistance() {
        let pipeline = pipeline(rough_weather(), FixedPredictor(Ok(450.0)));
        let record = pipeline.enrich(&snapshot()).await.unwrap();

        assert!(record.weather.available);
        assert!((record.weather.resistance_factor - 1.145).abs() < 1e-9);
        assert_eq!(record.base_co2, 450.0);
        assert!((record.adjusted_co2 - 515.25).abs() < 1e-9);
        assert!((record.delta_weather - 65.25).abs() < 1e-9);
        assert_eq!(record.mmsi, "419001");
    }

    #[tokio::test]
    async fn test_weather_failure_degrades_to_neutral() {
        let pipeline = pipeline(None, FixedPredictor(Ok(450.0)));
        let record = pipeline.enrich(&snapshot()).await.unwrap();

        assert!(!record.weather.available);
        assert_eq!(record.weather.resistance_factor, 1.0);
        assert_eq!(record.adjusted_co2, 450.0);
        assert_eq!(record.delta_weather, 0.0);
    }

    #[tokio::test]
    async fn test_predictor_failure_fails_enrichment() {
        let pipeline = pipeline(rough_weather(), FixedPredictor(Err(PredictorError::Status(500))));
        let result = pipeline.enrich(&snapshot()).await;
        assert!(matches!(
            result,
            Err(EnrichError::Prediction(PredictorError::Status(500)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predictor_timeout() {
        let pipeline = pipeline(rough_weather(), StalledPredictor);
        let result = pipeline.enrich(&snapshot()).await;
        assert!(matches!(
            result,
            Err(EnrichError::Prediction(PredictorError::Timeout(1000)))
        ));
    }

    #[tokio::test]
    async fn test_zero_distance_scores_within_bounds() {
        let pipeline = pipeline(rough_weather(), FixedPredictor(Ok(500.0)));
        let mut snap = snapshot();
        snap.features.distance_km = 0.0;

        let record = pipeline.enrich(&snap).await.unwrap();
        assert!(record.esg_score <= 100);
        assert!(record
            .risk_flags
            .iter()
            .any(|f| f == "High CO2 intensity"));
        assert_ne!(record.rating, Rating::Excellent);
    }
}
