use std::sync::Arc;

use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};

use crate::{
    api::{department, employee, leave_request, salary},
    auth::{
        handlers,
        middleware::{admin_only, auth_middleware, employee_only},
    },
    config::Config,
    error::{json_error_handler, path_error_handler, query_error_handler},
};

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiters, built once so every worker draws from the same buckets.
#[derive(Clone)]
pub struct RateLimiters {
    login: Arc<Limiter>,
    protected: Arc<Limiter>,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;

    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &RateLimiters) {
    let prefix = config.api_prefix.trim_end_matches('/');

    // Malformed bodies, queries and paths all surface as InvalidRequest
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    // Public: registered ahead of the protected scope so it matches first
    cfg.service(
        web::resource(format!("{prefix}/auth/login"))
            .wrap(limiters.login.clone())
            .route(web::post().to(handlers::login)),
    );

    // Protected routes. Role gates sit on the routes themselves so that a
    // caller of the wrong role is refused before the body is read.
    cfg.service(
        web::scope(prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(handlers::profile))
                            .route(
                                web::put()
                                    .to(handlers::update_profile)
                                    .wrap(from_fn(employee_only)),
                            ),
                    )
                    .route("/logout", web::post().to(handlers::logout))
                    .route(
                        "/register-admin",
                        web::post()
                            .to(handlers::register_admin)
                            .wrap(from_fn(admin_only)),
                    ),
            )
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(
                        web::resource("")
                            .route(
                                web::get()
                                    .to(leave_request::leave_list)
                                    .wrap(from_fn(admin_only)),
                            )
                            .route(
                                web::post()
                                    .to(leave_request::create_leave)
                                    .wrap(from_fn(employee_only)),
                            ),
                    )
                    // fixed segments before /{id}
                    .route(
                        "/my-history",
                        web::get()
                            .to(leave_request::my_history)
                            .wrap(from_fn(employee_only)),
                    )
                    .route(
                        "/balance",
                        web::get()
                            .to(leave_request::leave_balance)
                            .wrap(from_fn(employee_only)),
                    )
                    .service(
                        web::resource("/{id}").route(web::get().to(leave_request::get_leave)),
                    )
                    // /leaves/{id}/status
                    .service(
                        web::resource("/{id}/status").route(
                            web::put()
                                .to(leave_request::update_leave_status)
                                .wrap(from_fn(admin_only)),
                        ),
                    ),
            )
            .service(
                web::scope("/employees")
                    .wrap(from_fn(admin_only))
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/departments")
                    .wrap(from_fn(admin_only))
                    .service(
                        web::resource("")
                            .route(web::post().to(department::create_department))
                            .route(web::get().to(department::list_departments)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(department::update_department))
                            .route(web::delete().to(department::delete_department)),
                    ),
            )
            .service(
                web::scope("/salaries")
                    .wrap(from_fn(admin_only))
                    .service(
                        web::resource("")
                            .route(web::post().to(salary::create_salary))
                            .route(web::get().to(salary::list_salaries)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(salary::get_salary))
                            .route(web::put().to(salary::update_salary))
                            .route(web::delete().to(salary::delete_salary)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::AppState,
        test_support::{self, ALICE_ID},
    };
    use actix_web::{
        App,
        http::{Method, StatusCode},
        test::{self, TestRequest},
        web::Data,
    };
    use serde_json::{Value, json};

    fn request(method: Method, uri: &str) -> TestRequest {
        TestRequest::default()
            .method(method)
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
    }

    fn authed(method: Method, uri: &str, token: &str) -> TestRequest {
        request(method, uri).insert_header(("Authorization", format!("Bearer {token}")))
    }

    macro_rules! spawn_app {
        ($config:expr) => {{
            let config: Config = $config;
            let store = test_support::seeded_store().await;
            let state = Data::new(AppState::new(store.clone(), &config));
            let limiters = RateLimiters::from_config(&config).unwrap();
            let app = test::init_service(
                App::new()
                    .app_data(state)
                    .configure(|cfg| configure(cfg, &config, &limiters)),
            )
            .await;
            (app, store)
        }};
    }

    /// Status of a request whether it was answered by a handler or
    /// short-circuited by a middleware error.
    macro_rules! status_of {
        ($app:expr, $req:expr) => {{
            match test::try_call_service(&$app, $req.to_request()).await {
                Ok(resp) => resp.status(),
                Err(err) => err.error_response().status(),
            }
        }};
    }

    macro_rules! login {
        ($app:expr, $body:expr) => {{
            let req = request(Method::POST, "/api/auth/login").set_json($body);
            let body: Value = test::call_and_read_body_json(&$app, req.to_request()).await;
            body["token"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn employee_login_returns_token_and_safe_summary() {
        let (app, _) = spawn_app!(test_support::config());

        let req = request(Method::POST, "/api/auth/login")
            .set_json(json!({"employeeId": "EMP001", "password": "EMP001"}));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["role"], "employee");
        assert_eq!(body["employeeId"], "EMP001");
        assert_eq!(body["name"], "Alice");
        assert!(body["token"].as_str().is_some());
        assert!(!body.to_string().to_lowercase().contains("password"));
    }

    #[actix_web::test]
    async fn wrong_password_is_401_invalid_credentials() {
        let (app, _) = spawn_app!(test_support::config());

        let req = request(Method::POST, "/api/auth/login")
            .set_json(json!({"employeeId": "EMP001", "password": "wrong"}));
        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "InvalidCredentials");
    }

    #[actix_web::test]
    async fn malformed_login_bodies_are_invalid_requests() {
        let (app, _) = spawn_app!(test_support::config());

        for body in [
            json!({"email": "admin@example.com", "employeeId": "EMP001", "password": "x"}),
            json!({"password": "x"}),
            json!({"employeeId": "EMP001", "password": "EMP001", "role": "admin"}),
        ] {
            let req = request(Method::POST, "/api/auth/login").set_json(body);
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "InvalidRequest");
        }
    }

    #[actix_web::test]
    async fn protected_routes_require_a_bearer_token() {
        let (app, _) = spawn_app!(test_support::config());

        let missing = test::call_service(&app, request(Method::GET, "/api/auth/profile").to_request()).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let garbage = status_of!(app, authed(Method::GET, "/api/auth/profile", "not-a-token"));
        assert_eq!(garbage, StatusCode::UNAUTHORIZED);

        let token = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));
        let resp = test::call_service(
            &app,
            authed(Method::GET, "/api/auth/profile", &token).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["role"], "admin");
    }

    #[actix_web::test]
    async fn employee_token_is_forbidden_on_every_admin_operation() {
        let (app, _) = spawn_app!(test_support::config());
        let token = login!(app, json!({"employeeId": "EMP002", "password": "EMP002"}));

        let attempts = [
            authed(Method::GET, "/api/leaves", &token),
            authed(Method::GET, "/api/leaves?search=EMP", &token),
            authed(Method::PUT, "/api/leaves/anything/status", &token)
                .set_json(json!({"status": "Approved"})),
            authed(Method::GET, "/api/employees", &token),
            authed(Method::DELETE, &format!("/api/employees/{ALICE_ID}"), &token),
            authed(Method::POST, "/api/auth/register-admin", &token)
                .set_json(json!({"name": "Eve", "email": "eve@example.com", "password": "pw"})),
            authed(Method::GET, "/api/departments", &token),
            authed(Method::POST, "/api/salaries", &token)
                .set_json(json!({"employeeId": ALICE_ID, "salary": 1.0})),
        ];

        for req in attempts {
            assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn wrong_role_is_refused_before_the_payload_is_read() {
        let (app, store) = spawn_app!(test_support::config());
        let bob = login!(app, json!({"employeeId": "EMP002", "password": "EMP002"}));
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));

        let as_employee = [
            authed(Method::PUT, "/api/leaves/x/status", &bob).set_json(json!({"status": "bogus"})),
            authed(Method::PUT, "/api/leaves/x/status", &bob).set_json(json!({})),
            authed(Method::PUT, "/api/leaves/x/status", &bob)
                .insert_header(("Content-Type", "application/json"))
                .set_payload("{not json"),
            authed(Method::POST, "/api/employees", &bob).set_json(json!({})),
            authed(Method::PUT, &format!("/api/employees/{ALICE_ID}"), &bob)
                .set_json(json!({"employeeId": "X"})),
            authed(Method::POST, "/api/auth/register-admin", &bob).set_json(json!({})),
            authed(Method::POST, "/api/departments", &bob).set_json(json!({"bogus": true})),
            authed(Method::PUT, "/api/salaries/x", &bob).set_json(json!({"total": -1})),
            authed(Method::GET, "/api/departments?sort=nonsense", &bob),
        ];
        for req in as_employee {
            assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);
        }

        let as_admin = [
            authed(Method::POST, "/api/leaves", &admin).set_json(json!({"leaveType": 7})),
            authed(Method::PUT, "/api/auth/profile", &admin).set_json(json!({"role": "x"})),
        ];
        for req in as_admin {
            assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);
        }

        let alice = test_support::summary(&store, ALICE_ID).await;
        assert_eq!(alice.employee_id.as_deref(), Some("EMP001"));
    }

    #[actix_web::test]
    async fn leave_lifecycle_over_http() {
        let (app, _) = spawn_app!(test_support::config());
        let alice = login!(app, json!({"employeeId": "EMP001", "password": "EMP001"}));
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));

        // Payload tries to file on Bob's behalf; ownership comes from the token.
        let req = authed(Method::POST, "/api/leaves", &alice).set_json(json!({
            "leaveType": "Sick Leave",
            "fromDate": "2025-08-01",
            "toDate": "2025-08-03",
            "reason": "Fever",
            "employeeId": test_support::BOB_ID,
        }));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["employeeId"], ALICE_ID);
        assert_eq!(created["status"], "Pending");
        let id = created["id"].as_str().unwrap().to_string();

        let listed: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/leaves?search=alice", &admin).to_request(),
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["employee"]["employeeId"], "EMP001");

        let approve = authed(Method::PUT, &format!("/api/leaves/{id}/status"), &admin)
            .set_json(json!({"status": "Approved"}));
        let resp = test::call_service(&app, approve.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let approved: Value = test::read_body_json(resp).await;
        assert_eq!(approved["status"], "Approved");

        let reject = authed(Method::PUT, &format!("/api/leaves/{id}/status"), &admin)
            .set_json(json!({"status": "Rejected"}));
        let resp = test::call_service(&app, reject.to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "InvalidTransition");

        let history: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/leaves/my-history", &alice).to_request(),
        )
        .await;
        assert_eq!(history[0]["status"], "Approved");

        let balance: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/leaves/balance", &alice).to_request(),
        )
        .await;
        let sick = balance
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["leaveType"] == "Sick Leave")
            .unwrap();
        assert_eq!(sick["approvedDays"], 3);
        assert_eq!(sick["remaining"], 7);
    }

    #[actix_web::test]
    async fn invalid_leave_input_is_400() {
        let (app, store) = spawn_app!(test_support::config());
        let alice = login!(app, json!({"employeeId": "EMP001", "password": "EMP001"}));

        let reversed = authed(Method::POST, "/api/leaves", &alice).set_json(json!({
            "leaveType": "Sick Leave", "fromDate": "2025-08-03", "toDate": "2025-08-01", "reason": "x"
        }));
        let resp = test::call_service(&app, reversed.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "InvalidDateRange");

        let bad_date = authed(Method::POST, "/api/leaves", &alice).set_json(json!({
            "leaveType": "Sick Leave", "fromDate": "tomorrow", "toDate": "2025-08-01"
        }));
        assert_eq!(status_of!(app, bad_date), StatusCode::BAD_REQUEST);

        assert!(crate::store::LeaveStore::list_leaves(&*store).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn deleting_an_employee_kills_their_session() {
        let (app, _) = spawn_app!(test_support::config());
        let carol = login!(app, json!({"employeeId": "EMP003", "password": "EMP003"}));
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));

        let delete = authed(
            Method::DELETE,
            &format!("/api/employees/{}", test_support::CAROL_ID),
            &admin,
        );
        assert_eq!(status_of!(app, delete), StatusCode::OK);

        let resp = test::call_service(
            &app,
            authed(Method::GET, "/api/auth/profile", &carol).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "PrincipalNotFound");
    }

    #[actix_web::test]
    async fn logout_revokes_the_token() {
        let (app, _) = spawn_app!(test_support::config());
        let token = login!(app, json!({"employeeId": "EMP002", "password": "EMP002"}));

        assert_eq!(
            status_of!(app, authed(Method::POST, "/api/auth/logout", &token)),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            status_of!(app, authed(Method::GET, "/api/auth/profile", &token)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn created_employee_logs_in_with_their_id_and_duplicates_conflict() {
        let (app, _) = spawn_app!(test_support::config());
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));
        let new_hire = json!({
            "name": "Dave",
            "employeeId": "EMP104",
            "email": "dave@company.com",
            "department": "Finance",
            "designation": "Analyst",
            "salary": 41000.0
        });

        let resp = test::call_service(
            &app,
            authed(Method::POST, "/api/employees", &admin)
                .set_json(&new_hire)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert!(created.get("passwordHash").is_none());

        let duplicate = authed(Method::POST, "/api/employees", &admin).set_json(&new_hire);
        assert_eq!(status_of!(app, duplicate), StatusCode::CONFLICT);

        let token = login!(app, json!({"employeeId": "EMP104", "password": "EMP104"}));
        let profile: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/auth/profile", &token).to_request(),
        )
        .await;
        assert_eq!(profile["department"], "Finance");

        let listed: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/employees?search=finance", &admin).to_request(),
        )
        .await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["data"][0]["employeeId"], "EMP104");
    }

    #[actix_web::test]
    async fn employee_id_cannot_be_changed_on_update() {
        let (app, _) = spawn_app!(test_support::config());
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));
        let uri = format!("/api/employees/{ALICE_ID}");

        let rename = authed(Method::PUT, &uri, &admin).set_json(json!({"employeeId": "EMP999"}));
        assert_eq!(status_of!(app, rename), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            authed(Method::PUT, &uri, &admin)
                .set_json(json!({"designation": "Lead", "password": "n3w-pass"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["designation"], "Lead");
        assert_eq!(updated["employeeId"], "EMP001");

        let relogin = request(Method::POST, "/api/auth/login")
            .set_json(json!({"employeeId": "EMP001", "password": "n3w-pass"}));
        assert_eq!(status_of!(app, relogin), StatusCode::OK);
    }

    #[actix_web::test]
    async fn departments_are_sorted_searched_and_paged() {
        let (app, _) = spawn_app!(test_support::config());
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));

        let mut ids = Vec::new();
        for name in ["Finance", "engineering", "Human Resources", "Sales"] {
            let created: Value = test::call_and_read_body_json(
                &app,
                authed(Method::POST, "/api/departments", &admin)
                    .set_json(json!({"name": name, "description": format!("{name} team")}))
                    .to_request(),
            )
            .await;
            ids.push(created["id"].as_str().unwrap().to_string());
        }

        let duplicate = authed(Method::POST, "/api/departments", &admin)
            .set_json(json!({"name": "FINANCE"}));
        assert_eq!(status_of!(app, duplicate), StatusCode::CONFLICT);

        let first_page: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/departments?per_page=2", &admin).to_request(),
        )
        .await;
        assert_eq!(first_page["total"], 4);
        assert_eq!(first_page["data"][0]["name"], "engineering");
        assert_eq!(first_page["data"][1]["name"], "Finance");

        let newest: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/departments?sort=createdAt&order=desc&per_page=1", &admin)
                .to_request(),
        )
        .await;
        assert_eq!(newest["data"][0]["name"], "Sales");

        let searched: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/departments?search=HUMAN", &admin).to_request(),
        )
        .await;
        assert_eq!(searched["total"], 1);

        let bad_sort = authed(Method::GET, "/api/departments?sort=budget", &admin);
        assert_eq!(status_of!(app, bad_sort), StatusCode::BAD_REQUEST);

        let renamed: Value = test::call_and_read_body_json(
            &app,
            authed(Method::PUT, &format!("/api/departments/{}", ids[3]), &admin)
                .set_json(json!({"name": "Sales & Marketing", "description": ""}))
                .to_request(),
        )
        .await;
        assert_eq!(renamed["name"], "Sales & Marketing");
        assert!(renamed["description"].is_null());

        let clash = authed(Method::PUT, &format!("/api/departments/{}", ids[3]), &admin)
            .set_json(json!({"name": "finance"}));
        assert_eq!(status_of!(app, clash), StatusCode::CONFLICT);

        let uri = format!("/api/departments/{}", ids[0]);
        assert_eq!(status_of!(app, authed(Method::DELETE, &uri, &admin)), StatusCode::OK);
        assert_eq!(
            status_of!(app, authed(Method::DELETE, &uri, &admin)),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn salary_totals_are_derived_and_recomputed() {
        let (app, _) = spawn_app!(test_support::config());
        let admin = login!(app, json!({"email": "admin@example.com", "password": "admin123"}));

        let resp = test::call_service(
            &app,
            authed(Method::POST, "/api/salaries", &admin)
                .set_json(json!({
                    "employeeId": ALICE_ID,
                    "salary": 50000.0,
                    "allowance": 5000.0,
                    "deduction": 2000.0,
                    "payDate": "2025-08-31"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["total"], 53000.0);
        let uri = format!("/api/salaries/{}", created["id"].as_str().unwrap());

        let caller_total = authed(Method::POST, "/api/salaries", &admin)
            .set_json(json!({"employeeId": ALICE_ID, "salary": 1.0, "total": 1e9}));
        assert_eq!(status_of!(app, caller_total), StatusCode::BAD_REQUEST);

        let negative = authed(Method::POST, "/api/salaries", &admin)
            .set_json(json!({"employeeId": ALICE_ID, "salary": -5.0}));
        assert_eq!(status_of!(app, negative), StatusCode::BAD_REQUEST);

        let stranger = authed(Method::POST, "/api/salaries", &admin)
            .set_json(json!({"employeeId": "nobody", "salary": 5.0}));
        assert_eq!(status_of!(app, stranger), StatusCode::NOT_FOUND);

        let updated: Value = test::call_and_read_body_json(
            &app,
            authed(Method::PUT, &uri, &admin)
                .set_json(json!({"deduction": 10000.0}))
                .to_request(),
        )
        .await;
        assert_eq!(updated["total"], 45000.0);

        let listed: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, &format!("/api/salaries?employeeId={ALICE_ID}"), &admin)
                .to_request(),
        )
        .await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["data"][0]["employee"]["employeeId"], "EMP001");
        assert_eq!(listed["data"][0]["total"], 45000.0);

        assert_eq!(status_of!(app, authed(Method::DELETE, &uri, &admin)), StatusCode::OK);
        assert_eq!(
            status_of!(app, authed(Method::GET, &uri, &admin)),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn employees_update_their_own_profile() {
        let (app, _) = spawn_app!(test_support::config());
        let alice = login!(app, json!({"employeeId": "EMP001", "password": "EMP001"}));

        let resp = test::call_service(
            &app,
            authed(Method::PUT, "/api/auth/profile", &alice)
                .set_json(json!({"name": "Alice Smith", "image": "alice.png"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["name"], "Alice Smith");
        assert_eq!(updated["employeeId"], "EMP001");

        let profile: Value = test::call_and_read_body_json(
            &app,
            authed(Method::GET, "/api/auth/profile", &alice).to_request(),
        )
        .await;
        assert_eq!(profile["image"], "alice.png");

        let escalate = authed(Method::PUT, "/api/auth/profile", &alice)
            .set_json(json!({"department": "Board"}));
        assert_eq!(status_of!(app, escalate), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn login_is_rate_limited_per_ip() {
        let config = Config {
            rate_login_per_min: 2,
            ..test_support::config()
        };
        let (app, _) = spawn_app!(config);

        let attempt = || {
            request(Method::POST, "/api/auth/login")
                .set_json(json!({"employeeId": "EMP001", "password": "wrong"}))
        };

        assert_eq!(status_of!(app, attempt()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of!(app, attempt()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of!(app, attempt()), StatusCode::TOO_MANY_REQUESTS);
    }
}
