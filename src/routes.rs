//! HTTP router assembly.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{config::Config, handlers, services::gateway::Gateway, views::Views};

/// State shared with every handler via `State` extraction.
///
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
}

/// Build the router serving the services menu, the nine operation pages and `/health`.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Services menu
        .route("/", get(handlers::services::show_services))
        .route("/services", get(handlers::services::show_services))
        // Account pages
        .route(
            "/enqacct",
            get(handlers::accounts::show_enquire_account).post(handlers::accounts::enquire_account),
        )
        .route(
            "/listacc",
            get(handlers::accounts::show_list_accounts).post(handlers::accounts::list_accounts),
        )
        .route(
            "/createacc",
            get(handlers::accounts::show_create_account).post(handlers::accounts::create_account),
        )
        .route(
            "/updateacc",
            get(handlers::accounts::show_update_account).post(handlers::accounts::update_account),
        )
        .route(
            "/delacct",
            get(handlers::accounts::show_delete_account).post(handlers::accounts::delete_account),
        )
        // Customer pages
        .route(
            "/enqcust",
            get(handlers::customers::show_enquire_customer)
                .post(handlers::customers::enquire_customer),
        )
        .route(
            "/createcust",
            get(handlers::customers::show_create_customer)
                .post(handlers::customers::create_customer),
        )
        .route(
            "/updatecust",
            get(handlers::customers::show_update_customer)
                .post(handlers::customers::update_customer),
        )
        .route(
            "/delcust",
            get(handlers::customers::show_delete_customer)
                .post(handlers::customers::delete_customer),
        )
        .route("/health", get(handlers::health::health_check))
        // Per-request spans
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json,
        body::Body,
        extract::Path,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::{delete, post},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use tower::ServiceExt; // For oneshot()
    use url::Url;

    /// Start a stand-in backend and return app state pointing at it.
    async fn state_for(backend: Router) -> AppState {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        let config = Config {
            backend_url: format!("http://{addr}"),
            ..Config::default()
        };
        let base = Url::parse(&config.backend_url).unwrap();
        AppState {
            gateway: Gateway::new(&base, Duration::from_secs(5)).unwrap(),
            views: Arc::new(Views::new().unwrap()),
            config: Arc::new(config),
        }
    }

    async fn post_form(app: Router, uri: &str, form: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn get_pages_render_empty_forms() {
        let app = router(state_for(Router::new()).await);

        for uri in [
            "/",
            "/services",
            "/enqacct",
            "/enqcust",
            "/listacc",
            "/createacc",
            "/createcust",
            "/updateacc",
            "/updatecust",
            "/delacct",
            "/delcust",
        ] {
            let (status, html) = get_page(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(html.contains("<h1>"), "{uri}");
            assert!(!html.contains("class=\"results"), "{uri}");
        }
    }

    #[tokio::test]
    async fn delete_account_not_found_page() {
        let backend = Router::new().route(
            "/delacc/remove/{acct}",
            delete(|Path(acct): Path<String>| async move {
                assert_eq!(acct, "12345678");
                Json(json!({ "DELACC_COMMAREA": { "DELACC_DEL_FAIL_CD": 1 } }))
            }),
        );
        let app = router(state_for(backend).await);

        let (status, html) = post_form(app, "/delacct", "acct_number=12345678").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h2>Request Error</h2>"));
        assert!(html.contains(
            "The account you searched for could not be found; Try a different account number."
        ));
        // The submitted number stays in the form.
        assert!(html.contains("value=\"12345678\""));
    }

    #[tokio::test]
    async fn create_account_sends_commarea_and_reports_too_many() {
        let backend = Router::new().route(
            "/creacc/insert",
            post(|Json(mut body): Json<Value>| async move {
                assert_eq!(body["CREACC"]["COMM_CUSTNO"], "0000004455");
                assert_eq!(body["CREACC"]["COMM_ACC_TYPE"], "ISA");
                assert_eq!(body["CREACC"]["COMM_KEY"]["COMM_SORTCODE"], "987654");
                body["CREACC"]["COMM_SUCCESS"] = json!("N");
                body["CREACC"]["COMM_FAIL_CODE"] = json!("8");
                body["CREACC"]["COMM_CUSTNO"] = json!("4455");
                Json(body)
            }),
        );
        let app = router(state_for(backend).await);

        let (_, html) = post_form(
            app,
            "/createacc",
            "cust_number=4455&account_type=ISA&interest_rate=1.5&overdraft_limit=0",
        )
        .await;
        assert!(html.contains("<h2>Account Error</h2>"));
        assert!(html.contains(
            "Too many accounts for customer number 4455; Try deleting an account first."
        ));
        assert!(html.contains("<option value=\"ISA\" selected>"));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let backend = Router::new().fallback(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }
        });
        let app = router(state_for(backend).await);

        let (status, html) = post_form(app.clone(), "/enqcust", "cust_number=12ab").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Customer number must contain digits only"));
        assert!(!html.contains("class=\"results"));

        let (_, html) = post_form(
            app,
            "/createcust",
            "cust_title=Mr&cust_name=&cust_address=1+Road&date_of_birth=1990-02-30",
        )
        .await;
        assert!(html.contains("Name must not be empty"));
        assert!(html.contains("Date of birth must be a date in YYYY-MM-DD form"));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_sends_number_as_entered() {
        let backend = Router::new().route(
            "/inqcustz/enquiry/{cust}",
            get(|Path(cust): Path<String>| async move {
                Json(json!({ "INQCUSTZ": {
                    "INQCUST_NAME": format!("path {cust}"),
                    "INQCUST_INQ_SUCCESS": "Y"
                } }))
            }),
        );
        let app = router(state_for(backend).await);

        let (_, html) = post_form(app, "/enqcust", "cust_number=+0000000042+").await;
        assert!(html.contains("<h2>Customer Details</h2>"));
        assert!(html.contains("Name: path 0000000042"));
    }

    #[tokio::test]
    async fn list_accounts_renders_table() {
        let backend = Router::new().route(
            "/inqacccz/list/{cust}",
            get(|| async {
                Json(json!({ "INQACCCZ": {
                    "CUSTOMER_NUMBER": "0000000042",
                    "CUSTOMER_FOUND": "Y",
                    "ACCOUNT_DETAILS": [
                        { "COMM_ACCNO": "00000011", "COMM_SCODE": "987654", "COMM_ACC_TYPE": "ISA" },
                        { "COMM_ACCNO": "00000012", "COMM_SCODE": "987654", "COMM_ACC_TYPE": "LOAN" }
                    ]
                } }))
            }),
        );
        let app = router(state_for(backend).await);

        let (_, html) = post_form(app, "/listacc", "cust_number=42").await;
        assert!(html.contains("<h2>Accounts belonging to customer 42:</h2>"));
        assert!(html.contains("<td>11</td>"));
        assert!(html.contains("<td>LOAN</td>"));
    }

    #[tokio::test]
    async fn unreachable_backend_page() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config {
            backend_url: format!("http://{addr}"),
            ..Config::default()
        };
        let base = Url::parse(&config.backend_url).unwrap();
        let app = router(AppState {
            gateway: Gateway::new(&base, Duration::from_secs(5)).unwrap(),
            views: Arc::new(Views::new().unwrap()),
            config: Arc::new(config),
        });

        let (_, html) = post_form(app, "/updatecust", "cust_number=42&cust_name=Jo").await;
        assert!(html.contains("<h2>Connection Error</h2>"));
        assert!(html.contains("Are you using the right address and port?"));
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let state = state_for(Router::new()).await;
        let backend = state.config.backend_url.clone();
        let app = router(state);

        let (status, body) = get_page(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["backend"], backend);
    }
}
