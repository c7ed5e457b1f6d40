//! Tests for travel intent handlers over the in-memory stores.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{SignedInUser, json_body, memory_state, sign_up, test_app};

async fn create<S>(app: &S, owner: &SignedInUser, body: Value) -> actix_web::dev::ServiceResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/travel-intents")
        .insert_header(owner.bearer())
        .set_json(body)
        .to_request();
    actix_test::call_service(app, request).await
}

fn hanoi() -> Value {
    json!({ "destination": "Hanoi", "start_date": "2024-05-01" })
}

fn interest_request(
    method: actix_test::TestRequest,
    id: &str,
    user: &SignedInUser,
) -> actix_http::Request {
    method
        .uri(&format!("/api/v1/travel-intents/{id}/interest"))
        .insert_header(user.bearer())
        .to_request()
}

#[actix_web::test]
async fn create_returns_defaults_and_derived_fields() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;

    let response = create(&app, &owner, hanoi()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;

    assert_eq!(body["destination"], "Hanoi");
    assert_eq!(body["startDate"], "2024-05-01");
    assert_eq!(body["userId"], owner.id.as_str());
    assert_eq!(body["tripType"], json!(["adventure"]));
    assert_eq!(body["interestedUsers"], json!([]));
    assert_eq!(body["interestedUsersCount"], 0);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["hasGroup"], false);
    assert_eq!(body["groupId"], Value::Null);
}

#[actix_web::test]
async fn interest_lifecycle_follows_the_matching_rules() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let u1 = sign_up(&app, "u1_owner").await;
    let u2 = sign_up(&app, "u2_fan").await;
    let created = json_body(create(&app, &u1, hanoi()).await).await;
    let id = created["id"].as_str().expect("intent id").to_owned();

    let first = actix_test::call_service(
        &app,
        interest_request(actix_test::TestRequest::post(), &id, &u2),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = json_body(first).await;
    assert_eq!(body["interestedUsersCount"], 1);
    assert_eq!(body["interestedUsers"], json!([u2.id]));

    let repeat = actix_test::call_service(
        &app,
        interest_request(actix_test::TestRequest::post(), &id, &u2),
    )
    .await;
    assert_eq!(repeat.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(repeat).await["details"]["code"], "already_interested");

    let own = actix_test::call_service(
        &app,
        interest_request(actix_test::TestRequest::post(), &id, &u1),
    )
    .await;
    assert_eq!(own.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(own).await["details"]["code"], "self_interest");

    let removed = actix_test::call_service(
        &app,
        interest_request(actix_test::TestRequest::delete(), &id, &u2),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
    assert_eq!(json_body(removed).await["interestedUsersCount"], 0);

    let again = actix_test::call_service(
        &app,
        interest_request(actix_test::TestRequest::delete(), &id, &u2),
    )
    .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(again).await["details"]["code"], "not_interested");
}

#[actix_web::test]
async fn non_owner_update_is_forbidden_and_leaves_intent_unchanged() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;
    let other = sign_up(&app, "intruder").await;
    let created = json_body(create(&app, &owner, hanoi()).await).await;
    let id = created["id"].as_str().expect("intent id");

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/travel-intents/{id}"))
        .insert_header(other.bearer())
        .set_json(json!({ "destination": "Da Nang" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let fetch = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/travel-intents/{id}"))
        .insert_header(other.bearer())
        .to_request();
    let current = json_body(actix_test::call_service(&app, fetch).await).await;
    assert_eq!(current, created);
}

#[actix_web::test]
async fn owner_update_applies_only_present_fields() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;
    let created = json_body(
        create(
            &app,
            &owner,
            json!({
                "destination": "Hanoi",
                "startDate": "2024-05-01",
                "description": "Street food",
                "tripType": ["food_tour"],
            }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().expect("intent id");

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/travel-intents/{id}"))
        .insert_header(owner.bearer())
        .set_json(json!({ "description": null, "trip_type": ["city", "nature"] }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;

    assert_eq!(updated["destination"], "Hanoi");
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["tripType"], json!(["city", "nature"]));
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[actix_web::test]
async fn deactivated_intent_drops_out_of_default_listing() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;
    let created = json_body(create(&app, &owner, hanoi()).await).await;
    let id = created["id"].as_str().expect("intent id");

    let delete = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/travel-intents/{id}"))
        .insert_header(owner.bearer())
        .to_request();
    let response = actix_test::call_service(&app, delete).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let active = actix_test::TestRequest::get()
        .uri("/api/v1/travel-intents")
        .insert_header(owner.bearer())
        .to_request();
    assert_eq!(
        json_body(actix_test::call_service(&app, active).await).await,
        json!([])
    );

    let everything = actix_test::TestRequest::get()
        .uri("/api/v1/travel-intents?active_only=false")
        .insert_header(owner.bearer())
        .to_request();
    let listed = json_body(actix_test::call_service(&app, everything).await).await;
    assert_eq!(listed[0]["isActive"], false);
}

#[actix_web::test]
async fn listing_filters_by_destination_newest_first() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;
    for destination in ["Bali", "Hanoi", "Ubud, bali"] {
        let response = create(
            &app,
            &owner,
            json!({ "destination": destination, "start_date": "2024-06-01" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/travel-intents?destination=BALI")
        .insert_header(owner.bearer())
        .to_request();
    let listed = json_body(actix_test::call_service(&app, request).await).await;
    let names: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|intent| intent["destination"].as_str())
        .collect();
    assert_eq!(names, ["Ubud, bali", "Bali"]);

    let paged = actix_test::TestRequest::get()
        .uri("/api/v1/travel-intents?skip=1&limit=1")
        .insert_header(owner.bearer())
        .to_request();
    let page = json_body(actix_test::call_service(&app, paged).await).await;
    assert_eq!(page.as_array().map(Vec::len), Some(1));
    assert_eq!(page[0]["destination"], "Hanoi");
}

#[rstest]
#[case::end_before_start(
    json!({ "destination": "Hanoi", "start_date": "2024-05-10", "end_date": "2024-05-01" }),
    "endDate",
    "end_before_start"
)]
#[case::missing_destination(json!({ "start_date": "2024-05-01" }), "destination", "missing_field")]
#[case::bad_date(
    json!({ "destination": "Hanoi", "start_date": "May 1st" }),
    "startDate",
    "invalid_date"
)]
#[case::unknown_trip_type(
    json!({ "destination": "Hanoi", "start_date": "2024-05-01", "trip_type": ["spaceflight"] }),
    "tripType",
    "invalid_enum"
)]
#[actix_web::test]
async fn create_rejects_invalid_fields(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;

    let response = create(&app, &owner, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(payload["details"]["field"], field);
    assert_eq!(payload["details"]["code"], code);
}

#[actix_web::test]
async fn malformed_id_is_a_validation_error() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let user = sign_up(&app, "walker").await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/travel-intents/not-a-uuid")
        .insert_header(user.bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn unknown_id_is_not_found() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let user = sign_up(&app, "walker").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/travel-intents/6f1c3f5e-8b44-4b7e-9d55-0d8c2b3f4a10/interest")
        .insert_header(user.bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::no_header(None)]
#[case::wrong_scheme(Some("Basic dXNlcjpwYXNz"))]
#[case::garbage_token(Some("Bearer not.a.token"))]
#[actix_web::test]
async fn routes_require_a_valid_bearer_token(#[case] authorization: Option<&str>) {
    let app = actix_test::init_service(test_app(memory_state())).await;

    let mut request = actix_test::TestRequest::get().uri("/api/v1/travel-intents");
    if let Some(value) = authorization {
        request = request.insert_header(("Authorization", value));
    }
    let response = actix_test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
}

#[actix_web::test]
async fn malformed_json_body_is_reported_as_invalid_request() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let owner = sign_up(&app, "owner").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/travel-intents")
        .insert_header(owner.bearer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"destination\": ")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(payload["details"]["code"], "malformed_json");
}
