//! Attribution service — records touchpoints and computes organic-vs-paid
//! credit for a campaign under one or all attribution models.

use crate::models::AttributionCalculator;
use crate::store::EventStore;
use campaign_core::config::AttributionConfig;
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{
    AttributionModel, AttributionReport, AttributionResult, AttributionSummary,
    NewTouchpointEvent, TouchpointEvent,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct AttributionService {
    store: Arc<dyn EventStore>,
    calculator: AttributionCalculator,
    lenient_model_fallback: bool,
}

impl AttributionService {
    /// Fails with `CampaignError::Config` unless `half_life_days` is a
    /// positive finite number.
    pub fn new(store: Arc<dyn EventStore>, config: &AttributionConfig) -> CampaignResult<Self> {
        if !(config.half_life_days.is_finite() && config.half_life_days > 0.0) {
            return Err(CampaignError::Config(format!(
                "attribution.half_life_days must be a positive number, got {}",
                config.half_life_days
            )));
        }
        Ok(Self {
            store,
            calculator: AttributionCalculator::new(config.half_life_days),
            lenient_model_fallback: config.lenient_model_fallback,
        })
    }

    /// Resolve a caller-supplied model identifier. Unknown identifiers are
    /// rejected unless lenient fallback to LINEAR is configured.
    pub fn resolve_model(&self, identifier: &str) -> CampaignResult<AttributionModel> {
        match identifier.parse::<AttributionModel>() {
            Ok(model) => Ok(model),
            Err(_) if self.lenient_model_fallback => {
                warn!(model = identifier, "Unknown attribution model, falling back to LINEAR");
                Ok(AttributionModel::Linear)
            }
            Err(e) => Err(e),
        }
    }

    /// Record a single touchpoint. Only field presence is checked; ordering
    /// and duplicates are accepted as given.
    pub async fn record_event(&self, input: NewTouchpointEvent) -> CampaignResult<TouchpointEvent> {
        if input.campaign_id.trim().is_empty() {
            return Err(CampaignError::Validation(
                "'campaign_id' must not be empty".to_string(),
            ));
        }
        if input.platform.trim().is_empty() {
            return Err(CampaignError::Validation(
                "'platform' must not be empty".to_string(),
            ));
        }

        let campaign_id = input.campaign_id.clone();
        let event = self.store.create_event(input).await.map_err(|e| {
            error!(campaign_id = %campaign_id, error = %e, "Failed to record touchpoint");
            e
        })?;

        debug!(
            campaign_id = %event.campaign_id,
            event_id = %event.id,
            event_type = ?event.event_type,
            touchpoint_type = ?event.touchpoint_type,
            "Touchpoint recorded"
        );
        Ok(event)
    }

    /// Ordered touchpoints for a campaign.
    pub async fn events(&self, campaign_id: &str) -> CampaignResult<Vec<TouchpointEvent>> {
        self.fetch(campaign_id).await
    }

    /// Run one model against the campaign's current events.
    pub async fn calculate_attribution(
        &self,
        campaign_id: &str,
        model: AttributionModel,
    ) -> CampaignResult<AttributionResult> {
        self.calculate_attribution_at(campaign_id, model, Utc::now())
            .await
    }

    /// As [`calculate_attribution`](Self::calculate_attribution), with an
    /// explicit reference instant for time-decay weighting.
    pub async fn calculate_attribution_at(
        &self,
        campaign_id: &str,
        model: AttributionModel,
        now: DateTime<Utc>,
    ) -> CampaignResult<AttributionResult> {
        let events = self.fetch(campaign_id).await?;
        let result = self.calculator.calculate(model, campaign_id, &events, now);
        debug!(
            campaign_id,
            model = %model,
            touchpoints = events.len(),
            organic = result.organic_contribution,
            paid = result.paid_contribution,
            "Attribution calculated"
        );
        Ok(result)
    }

    /// Run all models against one snapshot of the campaign's events.
    pub async fn get_report(&self, campaign_id: &str) -> CampaignResult<AttributionReport> {
        self.get_report_at(campaign_id, Utc::now()).await
    }

    pub async fn get_report_at(
        &self,
        campaign_id: &str,
        now: DateTime<Utc>,
    ) -> CampaignResult<AttributionReport> {
        let events = self.fetch(campaign_id).await?;
        let report = self.build_report(campaign_id, &events, now);
        info!(
            campaign_id,
            touchpoints = events.len(),
            recommended = %report.recommended_model,
            half_life_days = self.calculator.half_life_days(),
            "Attribution report generated"
        );
        Ok(report)
    }

    fn build_report(
        &self,
        campaign_id: &str,
        events: &[TouchpointEvent],
        now: DateTime<Utc>,
    ) -> AttributionReport {
        let models: Vec<AttributionResult> = AttributionModel::ALL
            .iter()
            .map(|model| self.calculator.calculate(*model, campaign_id, events, now))
            .collect();

        AttributionReport {
            campaign_id: campaign_id.to_string(),
            recommended_model: recommend(&models),
            summary: summarize(&models),
            models,
            generated_at: now,
        }
    }

    async fn fetch(&self, campaign_id: &str) -> CampaignResult<Vec<TouchpointEvent>> {
        self.store
            .find_events_for_campaign(campaign_id)
            .await
            .map_err(|e| {
                error!(campaign_id, error = %e, "Failed to load touchpoints");
                e
            })
    }
}

/// Highest-confidence model. Ties keep the earliest result, so an all-empty
/// report recommends LINEAR.
fn recommend(results: &[AttributionResult]) -> AttributionModel {
    results
        .iter()
        .fold(None::<&AttributionResult>, |best, r| match best {
            Some(b) if b.confidence >= r.confidence => Some(b),
            _ => Some(r),
        })
        .map(|r| r.model)
        .unwrap_or(AttributionModel::Linear)
}

fn summarize(results: &[AttributionResult]) -> AttributionSummary {
    let n = results.len().max(1) as f64;
    let mean = |f: fn(&AttributionResult) -> f64| results.iter().map(f).sum::<f64>() / n;

    AttributionSummary {
        organic_percentage: mean(|r| r.organic_contribution),
        paid_percentage: mean(|r| r.paid_contribution),
        overlap_percentage: mean(|r| r.overlap_contribution),
        total_conversions: results
            .iter()
            .find(|r| r.model == AttributionModel::Linear)
            .map(|r| r.details.conversions)
            .unwrap_or(0),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
