//! Attribution model calculators.
//!
//! Every calculator is a pure function over an event slice that is already
//! ordered by `occurred_at`. Wall-clock time is never read here; the
//! time-decay model takes its reference instant as a parameter.

use campaign_core::types::{
    AttributionDetails, AttributionModel, AttributionResult, TouchpointEvent, TouchpointType,
};
use chrono::{DateTime, Utc};

/// Default half-life for the time-decay curve.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 7.0;

/// Weight given to each of the first and last touchpoints.
const POSITION_ENDPOINT_WEIGHT: f64 = 0.4;
/// Weight shared evenly by all touchpoints between first and last.
const POSITION_MIDDLE_WEIGHT: f64 = 0.2;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Floor a difference at zero. Absorbs rounding overshoot when two
/// independently rounded shares exceed their whole. Unordered values (NaN)
/// also map to zero.
pub fn clamp_non_negative<T: PartialOrd + Default>(value: T) -> T {
    let zero = T::default();
    if value >= zero {
        value
    } else {
        zero
    }
}

/// Runs any of the three models with shared parameters.
#[derive(Debug, Clone, Copy)]
pub struct AttributionCalculator {
    half_life_days: f64,
}

impl AttributionCalculator {
    pub fn new(half_life_days: f64) -> Self {
        Self { half_life_days }
    }

    pub fn half_life_days(&self) -> f64 {
        self.half_life_days
    }

    pub fn calculate(
        &self,
        model: AttributionModel,
        campaign_id: &str,
        events: &[TouchpointEvent],
        now: DateTime<Utc>,
    ) -> AttributionResult {
        match model {
            AttributionModel::Linear => linear(campaign_id, events),
            AttributionModel::TimeDecay => {
                time_decay(campaign_id, events, now, self.half_life_days)
            }
            AttributionModel::PositionBased => position_based(campaign_id, events),
        }
    }
}

impl Default for AttributionCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_LIFE_DAYS)
    }
}

/// Equal credit for every touchpoint, whatever its event type.
pub fn linear(campaign_id: &str, events: &[TouchpointEvent]) -> AttributionResult {
    let mut weights = ChannelWeights::default();
    for event in events {
        weights.add(event.touchpoint_type, 1.0);
    }
    weights.into_result(campaign_id, AttributionModel::Linear, events)
}

/// Credit halves every `half_life_days` of age relative to `now`.
pub fn time_decay(
    campaign_id: &str,
    events: &[TouchpointEvent],
    now: DateTime<Utc>,
    half_life_days: f64,
) -> AttributionResult {
    let mut weights = ChannelWeights::default();
    for event in events {
        let age_days = (now - event.occurred_at).num_milliseconds() as f64 / MILLIS_PER_DAY;
        weights.add(event.touchpoint_type, 0.5_f64.powf(age_days / half_life_days));
    }
    weights.into_result(campaign_id, AttributionModel::TimeDecay, events)
}

/// 40% to the first touchpoint, 40% to the last, 20% split across the rest.
pub fn position_based(campaign_id: &str, events: &[TouchpointEvent]) -> AttributionResult {
    let mut weights = ChannelWeights::default();
    match events {
        [] => {}
        [only] => weights.add(only.touchpoint_type, 1.0),
        [first, middle @ .., last] => {
            weights.add(first.touchpoint_type, POSITION_ENDPOINT_WEIGHT);
            weights.add(last.touchpoint_type, POSITION_ENDPOINT_WEIGHT);
            if !middle.is_empty() {
                let share = POSITION_MIDDLE_WEIGHT / middle.len() as f64;
                for event in middle {
                    weights.add(event.touchpoint_type, share);
                }
            }
        }
    }
    weights.into_result(campaign_id, AttributionModel::PositionBased, events)
}

/// Per-channel weight accumulator shared by all models.
///
/// Sums saturate at `f64::MAX` so far-future events under time decay stay
/// finite; NaN weights are dropped.
#[derive(Debug, Default)]
struct ChannelWeights {
    organic: f64,
    paid: f64,
}

impl ChannelWeights {
    fn add(&mut self, channel: TouchpointType, weight: f64) {
        if weight.is_nan() {
            return;
        }
        let slot = match channel {
            TouchpointType::Organic => &mut self.organic,
            TouchpointType::Paid => &mut self.paid,
        };
        *slot = (*slot + weight).min(f64::MAX);
    }

    fn into_result(
        self,
        campaign_id: &str,
        model: AttributionModel,
        events: &[TouchpointEvent],
    ) -> AttributionResult {
        if events.is_empty() {
            return AttributionResult::empty(campaign_id, model);
        }

        // Scale by the larger channel first so the sum cannot overflow.
        let scale = self.organic.max(self.paid);
        let (organic, paid) = if scale > 0.0 {
            let (o, p) = (self.organic / scale, self.paid / scale);
            (o / (o + p), p / (o + p))
        } else {
            (0.0, 0.0)
        };

        AttributionResult {
            campaign_id: campaign_id.to_string(),
            model,
            organic_contribution: organic,
            paid_contribution: paid,
            overlap_contribution: clamp_non_negative(1.0 - organic - paid),
            confidence: model.confidence(),
            details: details(events, organic, paid),
        }
    }
}

fn details(events: &[TouchpointEvent], organic: f64, paid: f64) -> AttributionDetails {
    let organic_touchpoints = events
        .iter()
        .filter(|e| e.touchpoint_type == TouchpointType::Organic)
        .count() as u64;
    let conversions = events.iter().filter(|e| e.is_conversion()).count() as u64;

    let attributed_organic = (conversions as f64 * organic).round() as u64;
    let attributed_paid = (conversions as f64 * paid).round() as u64;
    let attributed_overlap = clamp_non_negative(
        conversions as i64 - attributed_organic as i64 - attributed_paid as i64,
    ) as u64;

    AttributionDetails {
        total_touchpoints: events.len() as u64,
        organic_touchpoints,
        paid_touchpoints: events.len() as u64 - organic_touchpoints,
        conversions,
        attributed_organic_conversions: attributed_organic,
        attributed_paid_conversions: attributed_paid,
        attributed_overlap_conversions: attributed_overlap,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
