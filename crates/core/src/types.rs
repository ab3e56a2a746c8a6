//! Attribution domain types: touchpoint events, model identifiers, and the
//! computed results and reports built from them.

use crate::error::CampaignError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Touchpoints ────────────────────────────────────────────────────────────

/// Kind of user interaction. Only `Conversion` is treated specially: it is the
/// outcome being attributed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    View,
    Engagement,
    Click,
    Conversion,
}

/// The two channels whose contribution is being split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchpointType {
    Organic,
    Paid,
}

/// Immutable record of a single interaction attributable to a campaign.
///
/// Optional fields serialize as an explicit `null` so readers can tell
/// "never provided" apart from zero or empty values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TouchpointEvent {
    pub id: Uuid,
    pub campaign_id: String,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub event_type: EventType,
    pub touchpoint_type: TouchpointType,
    pub platform: String,
    pub event_value: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub event_metadata: Option<HashMap<String, serde_json::Value>>,
    /// Ordering key for every attribution model.
    pub occurred_at: DateTime<Utc>,
    /// When the store accepted the event. May be later than `occurred_at`.
    pub created_at: DateTime<Utc>,
}

impl TouchpointEvent {
    pub fn is_conversion(&self) -> bool {
        self.event_type == EventType::Conversion
    }
}

/// Ingestion input for a touchpoint. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NewTouchpointEvent {
    pub campaign_id: String,
    pub event_type: EventType,
    pub touchpoint_type: TouchpointType,
    pub platform: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub event_value: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub event_metadata: Option<HashMap<String, serde_json::Value>>,
}

impl NewTouchpointEvent {
    pub fn new(
        campaign_id: impl Into<String>,
        event_type: EventType,
        touchpoint_type: TouchpointType,
        platform: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            event_type,
            touchpoint_type,
            platform: platform.into(),
            occurred_at,
            session_id: None,
            user_id: None,
            event_value: None,
            event_metadata: None,
        }
    }

    /// Stamp the input with a fresh identifier and storage time.
    pub fn into_event(self, created_at: DateTime<Utc>) -> TouchpointEvent {
        TouchpointEvent {
            id: Uuid::new_v4(),
            campaign_id: self.campaign_id,
            session_id: self.session_id,
            user_id: self.user_id,
            event_type: self.event_type,
            touchpoint_type: self.touchpoint_type,
            platform: self.platform,
            event_value: self.event_value,
            event_metadata: self.event_metadata,
            occurred_at: self.occurred_at,
            created_at,
        }
    }
}

// ─── Models ─────────────────────────────────────────────────────────────────

/// Attribution model identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributionModel {
    Linear,
    TimeDecay,
    PositionBased,
}

impl AttributionModel {
    pub const ALL: [AttributionModel; 3] = [
        AttributionModel::Linear,
        AttributionModel::TimeDecay,
        AttributionModel::PositionBased,
    ];

    /// Designer-assigned trust in the model's output. Static metadata, not
    /// derived from the data, so it also decides the recommended model.
    pub fn confidence(&self) -> f64 {
        match self {
            AttributionModel::Linear => 0.8,
            AttributionModel::TimeDecay => 0.85,
            AttributionModel::PositionBased => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionModel::Linear => "LINEAR",
            AttributionModel::TimeDecay => "TIME_DECAY",
            AttributionModel::PositionBased => "POSITION_BASED",
        }
    }

    /// Permissive parse: unknown identifiers silently become `Linear`.
    pub fn parse_or_linear(s: &str) -> Self {
        s.parse().unwrap_or(AttributionModel::Linear)
    }
}

impl fmt::Display for AttributionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionModel {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "LINEAR" => Ok(AttributionModel::Linear),
            "TIME_DECAY" => Ok(AttributionModel::TimeDecay),
            "POSITION_BASED" => Ok(AttributionModel::PositionBased),
            _ => Err(CampaignError::UnsupportedModel(s.to_string())),
        }
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Raw counts behind an attribution result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AttributionDetails {
    pub total_touchpoints: u64,
    pub organic_touchpoints: u64,
    pub paid_touchpoints: u64,
    pub conversions: u64,
    pub attributed_organic_conversions: u64,
    pub attributed_paid_conversions: u64,
    pub attributed_overlap_conversions: u64,
}

/// Organic/paid credit split computed by one model. Never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AttributionResult {
    pub campaign_id: String,
    pub model: AttributionModel,
    pub organic_contribution: f64,
    pub paid_contribution: f64,
    pub overlap_contribution: f64,
    pub confidence: f64,
    pub details: AttributionDetails,
}

impl AttributionResult {
    /// Zero-valued result returned for a campaign with no events.
    pub fn empty(campaign_id: impl Into<String>, model: AttributionModel) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            model,
            organic_contribution: 0.0,
            paid_contribution: 0.0,
            overlap_contribution: 0.0,
            confidence: 0.0,
            details: AttributionDetails::default(),
        }
    }
}

/// Unweighted means across all models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AttributionSummary {
    pub organic_percentage: f64,
    pub paid_percentage: f64,
    pub overlap_percentage: f64,
    pub total_conversions: u64,
}

/// All three model results for one campaign, computed from a single snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AttributionReport {
    pub campaign_id: String,
    pub models: Vec<AttributionResult>,
    pub recommended_model: AttributionModel,
    pub summary: AttributionSummary,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parsing() {
        assert_eq!("LINEAR".parse::<AttributionModel>().unwrap(), AttributionModel::Linear);
        assert_eq!(
            "time_decay".parse::<AttributionModel>().unwrap(),
            AttributionModel::TimeDecay
        );
        assert_eq!(
            "position-based".parse::<AttributionModel>().unwrap(),
            AttributionModel::PositionBased
        );

        let err = "LAST_TOUCH".parse::<AttributionModel>().unwrap_err();
        assert!(matches!(err, CampaignError::UnsupportedModel(ref m) if m == "LAST_TOUCH"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_lenient_parse_falls_back_to_linear() {
        assert_eq!(AttributionModel::parse_or_linear("FIRST_TOUCH"), AttributionModel::Linear);
        assert_eq!(
            AttributionModel::parse_or_linear("POSITION_BASED"),
            AttributionModel::PositionBased
        );
    }

    #[test]
    fn test_confidence_constants() {
        assert_eq!(AttributionModel::Linear.confidence(), 0.8);
        assert_eq!(AttributionModel::TimeDecay.confidence(), 0.85);
        assert_eq!(AttributionModel::PositionBased.confidence(), 0.9);
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let event = NewTouchpointEvent::new(
            "camp_1",
            EventType::Click,
            TouchpointType::Paid,
            "instagram",
            Utc::now(),
        )
        .into_event(Utc::now());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "CLICK");
        assert_eq!(json["touchpoint_type"], "PAID");
        assert!(json.get("session_id").unwrap().is_null());
        assert!(json.get("event_value").unwrap().is_null());
        assert!(json.get("event_metadata").unwrap().is_null());
    }

    #[test]
    fn test_new_event_deserializes_without_optionals() {
        let input: NewTouchpointEvent = serde_json::from_str(
            r#"{
                "campaign_id": "camp_1",
                "event_type": "CONVERSION",
                "touchpoint_type": "ORGANIC",
                "platform": "twitter",
                "occurred_at": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(input.event_type, EventType::Conversion);
        assert!(input.user_id.is_none());
        assert!(input.event_metadata.is_none());
    }
}
