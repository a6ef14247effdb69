use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    errors::{Error, Result},
    middleware::auth_jwt_middleware,
    state::AppState,
};

pub mod applications;
pub mod session;
pub mod volunteers;

pub async fn root_route() -> &'static str {
    "Voluntree server is running!"
}

pub fn app(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.cors_origins)?;

    Ok(Router::new()
        .merge(unprotected(state.clone()))
        .merge(protected(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

fn unprotected(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(root_route))
        .route("/jwt", post(session::issue_token))
        .route("/logout", post(session::logout))
        .route("/volunteers-upcoming", get(volunteers::upcoming))
        .route("/volunteers", get(volunteers::list))
        .route("/number-of-post", get(volunteers::count))
        .with_state(state)
}

fn protected(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/volunteers", post(volunteers::create))
        .route(
            "/volunteers/{id}",
            get(volunteers::read)
                .put(volunteers::update)
                .delete(volunteers::delete),
        )
        .route("/my-volunteer-posts/{email}", get(volunteers::mine))
        // email on GET, application id on DELETE
        .route(
            "/my-applied-posts/{key}",
            get(applications::applied).delete(applications::withdraw),
        )
        .route("/applied-as-a-volunteer", post(applications::submit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| Error::Config(format!("invalid CORS origin `{origin}`: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::SET_COOKIE},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::utils::jwt::{Claims, encode_jwt};

    async fn test_app() -> (Router, AppState) {
        let state = AppState::for_tests().await;
        (app(state.clone()).expect("router"), state)
    }

    fn cookie_for(state: &AppState, email: &str) -> String {
        let token = encode_jwt(&Claims::new(email.to_string(), &state.config), &state.config)
            .expect("token");
        format!("token={token}")
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post_body(organizer: &str, needed: i64) -> Value {
        json!({
            "title": "Beach clean-up",
            "category": "Environment",
            "description": "Pick up litter along the shore",
            "location": "Cox's Bazar",
            "volunteers_needed": needed,
            "deadline": "2030-01-01T00:00:00.000Z",
            "thumbnail_URL": "https://img.example/beach.png",
            "organizer_name": "Alice",
            "organizer_email": organizer
        })
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let (app, _) = test_app().await;
        let response = app.oneshot(request("GET", "/", None, None)).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&bytes[..], b"Voluntree server is running!");
    }

    #[tokio::test]
    async fn jwt_sets_an_http_only_session_cookie() {
        let (app, _) = test_app().await;
        let response = app
            .oneshot(request("POST", "/jwt", None, Some(json!({ "email": "a@x.com" }))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .expect("ascii")
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert_eq!(json_body(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn jwt_rejects_a_malformed_identity() {
        let (app, _) = test_app().await;
        let response = app
            .oneshot(request("POST", "/jwt", None, Some(json!({ "email": "nope" }))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let (app, _) = test_app().await;
        let response = app
            .oneshot(request("POST", "/logout", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .expect("ascii")
            .to_string();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn protected_routes_require_a_session() {
        let (app, _) = test_app().await;
        let response = app
            .clone()
            .oneshot(request("GET", "/volunteers/anything", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Unauthorized access" })
        );

        let response = app
            .oneshot(request("GET", "/volunteers/anything", Some("token=forged"), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_header_is_accepted_without_a_cookie() {
        let (app, state) = test_app().await;
        let token = encode_jwt(&Claims::new("a@x.com".into(), &state.config), &state.config)
            .expect("token");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/my-volunteer-posts/a@x.com")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn listing_someone_elses_posts_is_forbidden() {
        let (app, state) = test_app().await;
        let cookie = cookie_for(&state, "b@x.com");
        for uri in ["/my-volunteer-posts/a@x.com", "/my-applied-posts/a@x.com"] {
            let response = app
                .clone()
                .oneshot(request("GET", uri, Some(&cookie), None))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                json_body(response).await,
                json!({ "message": "Forbidden access" })
            );
        }
    }

    #[tokio::test]
    async fn application_round_trip_over_http() {
        let (app, state) = test_app().await;
        let alice = cookie_for(&state, "a@x.com");
        let bob = cookie_for(&state, "b@x.com");

        let response = app
            .clone()
            .oneshot(request("POST", "/volunteers", Some(&alice), Some(post_body("a@x.com", 3))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let post_id = json_body(response).await["insertedId"]
            .as_str()
            .expect("id")
            .to_string();

        let application = json!({
            "postId": post_id,
            "applicant_email": "b@x.com",
            "organizer_email": "a@x.com",
            "volunteers_needed": 3,
            "suggestion": "I can bring gloves"
        });
        let response = app
            .clone()
            .oneshot(request("POST", "/applied-as-a-volunteer", Some(&bob), Some(application.clone())))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["acknowledged"], true);
        let application_id = body["insertedId"].as_str().expect("id").to_string();

        let response = app
            .clone()
            .oneshot(request("POST", "/applied-as-a-volunteer", Some(&bob), Some(application)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "You have already applied on this opportunity." })
        );

        let response = app
            .clone()
            .oneshot(request("GET", &format!("/volunteers/{post_id}"), Some(&bob), None))
            .await
            .expect("response");
        let post = json_body(response).await;
        assert_eq!(post["_id"], post_id.as_str());
        assert_eq!(post["volunteers_needed"], 2);

        let response = app
            .clone()
            .oneshot(request("GET", "/my-applied-posts/b@x.com", Some(&bob), None))
            .await
            .expect("response");
        let applied = json_body(response).await;
        assert_eq!(applied[0]["_id"], application_id.as_str());
        assert_eq!(applied[0]["suggestion"], "I can bring gloves");

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/my-applied-posts/{application_id}"), Some(&alice), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/my-applied-posts/{application_id}"), Some(&bob), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "acknowledged": true, "deletedCount": 1 })
        );

        let response = app
            .oneshot(request("GET", &format!("/volunteers/{post_id}"), Some(&bob), None))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["volunteers_needed"], 3);
    }

    #[tokio::test]
    async fn self_application_answers_not_allowed() {
        let (app, state) = test_app().await;
        let alice = cookie_for(&state, "a@x.com");
        let response = app
            .clone()
            .oneshot(request("POST", "/volunteers", Some(&alice), Some(post_body("a@x.com", 3))))
            .await
            .expect("response");
        let post_id = json_body(response).await["insertedId"]
            .as_str()
            .expect("id")
            .to_string();

        let response = app
            .oneshot(request(
                "POST",
                "/applied-as-a-volunteer",
                Some(&alice),
                Some(json!({
                    "postId": post_id,
                    "applicant_email": "a@x.com",
                    "organizer_email": "a@x.com",
                    "volunteers_needed": 3
                })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "message": "Not allowed" }));
    }

    #[tokio::test]
    async fn public_listing_and_count_share_the_search() {
        let (app, state) = test_app().await;
        let alice = cookie_for(&state, "a@x.com");
        for title in ["Beach clean-up", "Park CLEAN-up", "Blood drive"] {
            let mut body = post_body("a@x.com", 3);
            body["title"] = json!(title);
            let response = app
                .clone()
                .oneshot(request("POST", "/volunteers", Some(&alice), Some(body)))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(request("GET", "/number-of-post?searchQuery=clean", None, None))
            .await
            .expect("response");
        assert_eq!(json_body(response).await, json!({ "totalPost": 2 }));

        let response = app
            .clone()
            .oneshot(request("GET", "/volunteers?page=0&limit=1&searchQuery=clean", None, None))
            .await
            .expect("response");
        assert_eq!(json_body(response).await.as_array().expect("array").len(), 1);

        let response = app
            .clone()
            .oneshot(request("GET", "/volunteers", None, None))
            .await
            .expect("response");
        assert_eq!(json_body(response).await.as_array().expect("array").len(), 3);

        let response = app
            .oneshot(request("GET", "/volunteers-upcoming", None, None))
            .await
            .expect("response");
        assert_eq!(json_body(response).await.as_array().expect("array").len(), 3);
    }

    #[tokio::test]
    async fn invalid_post_body_is_rejected() {
        let (app, state) = test_app().await;
        let alice = cookie_for(&state, "a@x.com");

        let mut body = post_body("a@x.com", 3);
        body["deadline"] = json!("someday");
        let response = app
            .clone()
            .oneshot(request("POST", "/volunteers", Some(&alice), Some(body)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/volunteers")
                    .header("cookie", alice.as_str())
                    .header("content-type", "application/json")
                    .body(Body::from("{invalid"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_and_delete_over_http() {
        let (app, state) = test_app().await;
        let alice = cookie_for(&state, "a@x.com");
        let bob = cookie_for(&state, "b@x.com");

        let response = app
            .clone()
            .oneshot(request("PUT", "/volunteers/newpost", Some(&alice), Some(post_body("a@x.com", 4))))
            .await
            .expect("response");
        assert_eq!(
            json_body(response).await,
            json!({ "acknowledged": true, "matchedCount": 0, "upsertedId": "newpost" })
        );

        let response = app
            .clone()
            .oneshot(request("PUT", "/volunteers/newpost", Some(&bob), Some(post_body("a@x.com", 4))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("DELETE", "/volunteers/newpost", Some(&bob), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("DELETE", "/volunteers/newpost", Some(&alice), None))
            .await
            .expect("response");
        assert_eq!(
            json_body(response).await,
            json!({ "acknowledged": true, "deletedCount": 1 })
        );

        let response = app
            .oneshot(request("DELETE", "/volunteers/newpost", Some(&alice), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
