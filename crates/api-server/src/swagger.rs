//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaign Express Attribution API",
        version = "0.1.0",
        description = "Organic-vs-paid attribution for campaign touchpoints.\n\nSupports linear, time-decay, and position-based models.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Attribution", description = "Touchpoint ingestion, per-model attribution, and reports"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Attribution
        crate::attribution_rest::handle_record_event,
        crate::attribution_rest::handle_calculate,
        crate::attribution_rest::handle_report,
        crate::attribution_rest::handle_list_events,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        campaign_core::types::EventType,
        campaign_core::types::TouchpointType,
        campaign_core::types::TouchpointEvent,
        campaign_core::types::NewTouchpointEvent,
        campaign_core::types::AttributionModel,
        campaign_core::types::AttributionDetails,
        campaign_core::types::AttributionResult,
        campaign_core::types::AttributionSummary,
        campaign_core::types::AttributionReport,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_attribution_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/v1/attribution/events".to_string()));
        assert!(paths.contains(&"/v1/attribution/campaigns/{campaign_id}/report".to_string()));
        assert!(paths.contains(&"/health".to_string()));
    }
}
