use actix_web::{web, HttpResponse, Responder, ResponseError};

use crate::models::{ActivityRequest, DiscoverResponse};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/discover-activities").route(web::post().to(discover_activities)),
    );
}

/// Run the full planning pipeline for one request
async fn discover_activities(
    state: web::Data<AppState>,
    request: web::Json<ActivityRequest>,
) -> impl Responder {
    let request = request.into_inner();

    if let Err(e) = request.validate() {
        log::warn!("[discover] Rejected request: {}", e);
        return e.error_response();
    }

    log::info!(
        "[discover] child_age={} location='{}' interests={:?} budget={}",
        request.child_age,
        request.location,
        request.interests,
        request.budget_tier
    );

    match state.pipeline.run(request).await {
        Ok(synthesized) => HttpResponse::Ok().json(DiscoverResponse::from(synthesized)),
        Err(e) => {
            log::error!("[discover] Pipeline failed: {}", e);
            e.error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::test_state;
    use crate::models::TaskStatus;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_discover_returns_ranked_plan() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/discover-activities")
            .set_json(serde_json::json!({
                "child_age": 8,
                "location": "Cleveland, OH",
                "interests": ["science"],
                "budget_tier": "moderate"
            }))
            .to_request();

        let body: DiscoverResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.total_found > 0);
        assert!(!body.activities.is_empty());
        assert!(body.activities.iter().all(|a| a.min_age <= 8 && 8 <= a.max_age));
        assert_eq!(body.task_log.len(), 3);
        assert!(body.task_log.iter().all(|e| e.status == TaskStatus::Ok));
        assert!(body.result.contains("8-year-old"));
    }

    #[actix_web::test]
    async fn test_unsupported_location_rejected() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/discover-activities")
            .set_json(serde_json::json!({
                "child_age": 8,
                "location": "San Francisco, CA",
                "interests": ["science"]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Cleveland"));
    }

    #[actix_web::test]
    async fn test_age_out_of_range_rejected() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/discover-activities")
            .set_json(serde_json::json!({
                "child_age": 42,
                "location": "Cleveland, OH"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_defaults_fill_optional_fields() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(config)).await;

        // Only the two required fields; days, times, budget, and range default
        let req = test::TestRequest::post()
            .uri("/api/discover-activities")
            .set_json(serde_json::json!({
                "child_age": 5,
                "location": "Cleveland, Ohio"
            }))
            .to_request();

        let body: DiscoverResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.total_found > 0);
        assert!(body.result.contains("moderate"));
    }
}
