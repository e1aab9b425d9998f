//! Form-to-backend gateway.
//!
//! One generic call path serves all nine operations:
//!
//! 1. Render the URL (path key) or JSON body (create/update)
//! 2. Send exactly one request with the operation's method
//! 3. Decode the operation's envelope and classify it
//! 4. Turn the result, success or failure, into an [`Outcome`]
//!
//! No retries are attempted and nothing is kept between calls.

use std::time::Duration;

use reqwest::{
    Client, Method,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::Serialize;
use url::Url;

use crate::{
    error::GatewayError,
    models::{commarea::Envelope, outcome::Outcome},
};

/// The nine actions offered by the customer services pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EnquireAccount,
    EnquireCustomer,
    ListAccounts,
    CreateAccount,
    CreateCustomer,
    UpdateAccount,
    UpdateCustomer,
    DeleteAccount,
    DeleteCustomer,
}

/// Static description of how one operation talks to the backend and what
/// its results are called.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub method: Method,

    /// Backend path; lookups append `/{key}`
    pub path: &'static str,

    /// Zero-pad the key to this many digits (0 = as entered)
    pub key_width: usize,

    /// Heading on success; `{customer}` is replaced by the customer number where supported
    pub success_title: &'static str,

    /// Heading for named backend rejections
    pub rejection_title: &'static str,

    /// Heading for transport failures
    pub connection_title: &'static str,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::EnquireAccount,
        Operation::EnquireCustomer,
        Operation::ListAccounts,
        Operation::CreateAccount,
        Operation::CreateCustomer,
        Operation::UpdateAccount,
        Operation::UpdateCustomer,
        Operation::DeleteAccount,
        Operation::DeleteCustomer,
    ];

    pub fn descriptor(self) -> OperationDescriptor {
        let (method, path, key_width, success_title, rejection_title, connection_title) =
            match self {
                Operation::EnquireAccount => (
                    Method::GET,
                    "/inqaccz/enquiry",
                    0,
                    "Account Details:",
                    "Request Error",
                    "Request Error",
                ),
                Operation::EnquireCustomer => (
                    Method::GET,
                    "/inqcustz/enquiry",
                    0,
                    "Customer Details",
                    "Request Error",
                    "Request Error",
                ),
                Operation::ListAccounts => (
                    Method::GET,
                    "/inqacccz/list",
                    0,
                    "Accounts belonging to customer {customer}:",
                    "Request Error",
                    "Request Error",
                ),
                Operation::CreateAccount => (
                    Method::POST,
                    "/creacc/insert",
                    0,
                    "Account creation successful",
                    "Account Error",
                    "Connection Error",
                ),
                Operation::CreateCustomer => (
                    Method::POST,
                    "/crecust/insert",
                    0,
                    "Customer creation successful",
                    "Request Error",
                    "Connection Error",
                ),
                Operation::UpdateAccount => (
                    Method::PUT,
                    "/updacc/update",
                    0,
                    "Account updated",
                    "Update Error",
                    "Connection Error",
                ),
                Operation::UpdateCustomer => (
                    Method::PUT,
                    "/updcust/update",
                    0,
                    "Customer updated",
                    "Update Error",
                    "Connection Error",
                ),
                Operation::DeleteAccount => (
                    Method::DELETE,
                    "/delacc/remove",
                    0,
                    "Account Deleted",
                    "Request Error",
                    "Request Error",
                ),
                Operation::DeleteCustomer => (
                    Method::DELETE,
                    "/delcus/remove",
                    10,
                    "Customer and associated accounts Deleted",
                    "Request Error",
                    "Request Error",
                ),
            };

        OperationDescriptor {
            method,
            path,
            key_width,
            success_title,
            rejection_title,
            connection_title,
        }
    }
}

/// What the gateway sends: a record key in the path, or a JSON body.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Validated digits, sent as entered unless the operation pads them
    Key(String),
    Body(serde_json::Value),
}

/// Client for the banking backend.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base: String,
}

impl Gateway {
    /// Build a gateway for `base` whose calls give up after `timeout`.
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Look up or delete the record identified by `key`.
    pub async fn lookup<E: Envelope>(&self, operation: Operation, key: &str) -> Outcome {
        self.execute::<E>(operation, Payload::Key(key.to_string())).await
    }

    /// Send `body` as the JSON request body.
    pub async fn submit<E: Envelope, B: Serialize>(&self, operation: Operation, body: &B) -> Outcome {
        match serde_json::to_value(body) {
            Ok(value) => self.execute::<E>(operation, Payload::Body(value)).await,
            Err(err) => {
                let err = GatewayError::Encode(err);
                tracing::error!(?operation, "{err}");
                err.to_outcome(&operation.descriptor())
            }
        }
    }

    /// Perform one backend call and classify the result.
    ///
    /// Never fails: every error is turned into an outcome.
    pub async fn execute<E: Envelope>(&self, operation: Operation, payload: Payload) -> Outcome {
        let descriptor = operation.descriptor();
        let outcome = match self.call::<E>(&descriptor, payload).await {
            Ok(envelope) => envelope.into_outcome(descriptor.success_title),
            Err(err) => {
                match &err {
                    GatewayError::Rejected(failure) => {
                        tracing::info!(?operation, ?failure, "backend rejected request")
                    }
                    other => tracing::warn!(?operation, "{other}"),
                }
                err.to_outcome(&descriptor)
            }
        };
        tracing::info!(?operation, kind = ?outcome.kind, title = %outcome.title, "request complete");
        outcome
    }

    fn url(&self, descriptor: &OperationDescriptor, payload: &Payload) -> String {
        match payload {
            Payload::Key(key) => format!(
                "{}{}/{:0>width$}",
                self.base,
                descriptor.path,
                key,
                width = descriptor.key_width
            ),
            Payload::Body(_) => format!("{}{}", self.base, descriptor.path),
        }
    }

    async fn call<E: Envelope>(
        &self,
        descriptor: &OperationDescriptor,
        payload: Payload,
    ) -> Result<E, GatewayError> {
        let url = self.url(descriptor, &payload);
        let mut request = self
            .client
            .request(descriptor.method.clone(), &url)
            .header(ACCEPT, "application/json");

        match payload {
            Payload::Body(body) => {
                let json = serde_json::to_string(&body).map_err(GatewayError::Encode)?;
                tracing::info!(method = %descriptor.method, %url, body = %json, "sending backend request");
                request = request.header(CONTENT_TYPE, "application/json").body(json);
            }
            Payload::Key(_) => {
                tracing::info!(method = %descriptor.method, %url, "sending backend request");
            }
        }

        let response = request.send().await.map_err(GatewayError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_transport)?;
        tracing::info!(%status, body = %body, "backend response");

        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let envelope: E = serde_json::from_str(&body).map_err(|err| {
            tracing::warn!(body = %body, "unreadable backend response: {err}");
            GatewayError::Decode(err)
        })?;
        tracing::info!(?envelope, "parsed backend envelope");

        envelope.check()?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        account::{
            AccountEnquiryEnvelope, AccountListEnvelope, CreateAccountEnvelope,
            DeleteAccountEnvelope, UpdateAccountEnvelope,
        },
        customer::{
            CreateCustomerEnvelope, CustomerEnquiryEnvelope, DeleteCustomerEnvelope,
            UpdateCustomerEnvelope,
        },
        outcome::{CONNECTION_ERROR_MESSAGE, OutcomeKind, REQUEST_ERROR_MESSAGE},
    };
    use axum::{
        Json, Router,
        extract::Path,
        http::StatusCode,
        routing::{delete, get, post, put},
    };
    use serde_json::{Value, json};

    /// Start a stand-in backend and return a gateway pointed at it.
    async fn backend(router: Router) -> Gateway {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let base = Url::parse(&format!("http://{addr}")).unwrap();
        Gateway::new(&base, Duration::from_secs(5)).unwrap()
    }

    /// A gateway whose backend port is closed.
    async fn unreachable() -> Gateway {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        Gateway::new(&base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn descriptors_follow_the_backend_routes() {
        let methods: Vec<_> = Operation::ALL
            .iter()
            .map(|op| op.descriptor().method)
            .collect();
        assert_eq!(
            methods,
            vec![
                Method::GET,
                Method::GET,
                Method::GET,
                Method::POST,
                Method::POST,
                Method::PUT,
                Method::PUT,
                Method::DELETE,
                Method::DELETE,
            ]
        );
    }

    #[tokio::test]
    async fn urls_substitute_and_pad_keys() {
        let base = Url::parse("http://mainframe:30701/").unwrap();
        let gateway = Gateway::new(&base, Duration::from_secs(1)).unwrap();

        let enquire = Operation::EnquireAccount.descriptor();
        assert_eq!(
            gateway.url(&enquire, &Payload::Key("12345678".to_string())),
            "http://mainframe:30701/inqaccz/enquiry/12345678"
        );

        assert_eq!(
            gateway.url(&enquire, &Payload::Key("00000042".to_string())),
            "http://mainframe:30701/inqaccz/enquiry/00000042"
        );

        let delete = Operation::DeleteCustomer.descriptor();
        assert_eq!(
            gateway.url(&delete, &Payload::Key("42".to_string())),
            "http://mainframe:30701/delcus/remove/0000000042"
        );

        let create = Operation::CreateAccount.descriptor();
        assert_eq!(
            gateway.url(&create, &Payload::Body(json!({}))),
            "http://mainframe:30701/creacc/insert"
        );
    }

    #[tokio::test]
    async fn delete_account_not_found() {
        let gateway = backend(Router::new().route(
            "/delacc/remove/{acct}",
            delete(|| async { Json(json!({ "DELACC_COMMAREA": { "DELACC_DEL_FAIL_CD": 1 } })) }),
        ))
        .await;

        let outcome = gateway
            .lookup::<DeleteAccountEnvelope>(Operation::DeleteAccount, "12345678")
            .await;
        assert_eq!(outcome.kind, OutcomeKind::NotFound);
        assert_eq!(outcome.title, "Request Error");
        assert_eq!(
            outcome.detail,
            "The account you searched for could not be found; Try a different account number."
        );
    }

    #[tokio::test]
    async fn create_account_too_many() {
        let gateway = backend(Router::new().route(
            "/creacc/insert",
            post(|Json(mut body): Json<Value>| async move {
                body["CREACC"]["COMM_SUCCESS"] = json!("N");
                body["CREACC"]["COMM_FAIL_CODE"] = json!("8");
                body["CREACC"]["COMM_CUSTNO"] = json!("4455");
                Json(body)
            }),
        ))
        .await;

        let request = json!({ "CREACC": { "COMM_CUSTNO": "0000004455", "COMM_ACC_TYPE": "ISA" } });
        let outcome = gateway
            .submit::<CreateAccountEnvelope, _>(Operation::CreateAccount, &request)
            .await;
        assert_eq!(outcome.kind, OutcomeKind::TooManyAccounts);
        assert_eq!(outcome.title, "Account Error");
        assert_eq!(
            outcome.detail,
            "Too many accounts for customer number 4455; Try deleting an account first."
        );
    }

    #[tokio::test]
    async fn every_operation_succeeds_on_a_success_envelope() {
        let router = Router::new()
            .route(
                "/inqaccz/enquiry/{acct}",
                get(|Path(acct): Path<String>| async move {
                    Json(json!({ "INQACC_COMMAREA": {
                        "INQACC_ACCNO": acct, "INQACC_CUSTNO": 7, "INQACC_SUCCESS": "Y"
                    } }))
                }),
            )
            .route(
                "/inqcustz/enquiry/{cust}",
                get(|Path(cust): Path<String>| async move {
                    Json(json!({ "INQCUSTZ": {
                        "INQCUST_CUSTNO": cust, "INQCUST_NAME": "Mr Jo Bloggs", "INQCUST_INQ_SUCCESS": "Y"
                    } }))
                }),
            )
            .route(
                "/inqacccz/list/{cust}",
                get(|Path(cust): Path<String>| async move {
                    Json(json!({ "INQACCCZ": {
                        "CUSTOMER_NUMBER": cust,
                        "CUSTOMER_FOUND": "Y",
                        "ACCOUNT_DETAILS": [{ "COMM_ACCNO": 11, "COMM_ACC_TYPE": "ISA" }]
                    } }))
                }),
            )
            .route(
                "/creacc/insert",
                post(|Json(mut body): Json<Value>| async move {
                    body["CREACC"]["COMM_SUCCESS"] = json!("Y");
                    body["CREACC"]["COMM_KEY"]["COMM_NUMBER"] = json!(99);
                    Json(body)
                }),
            )
            .route(
                "/crecust/insert",
                post(|Json(mut body): Json<Value>| async move {
                    body["CRECUST"]["COMM_FAIL_CODE"] = json!("");
                    body["CRECUST"]["COMM_KEY"]["COMM_NUMBER"] = json!("0000000077");
                    Json(body)
                }),
            )
            .route(
                "/updacc/update",
                put(|Json(mut body): Json<Value>| async move {
                    body["UPDACC"]["COMM_SUCCESS"] = json!("Y");
                    Json(body)
                }),
            )
            .route(
                "/updcust/update",
                put(|Json(mut body): Json<Value>| async move {
                    body["UPDCUST"]["COMM_UPD_SUCCESS"] = json!("Y");
                    Json(body)
                }),
            )
            .route(
                "/delacc/remove/{acct}",
                delete(|Path(acct): Path<String>| async move {
                    Json(json!({ "DELACC_COMMAREA": { "DELACC_ACCNO": acct, "DELACC_DEL_FAIL_CD": 0 } }))
                }),
            )
            .route(
                "/delcus/remove/{cust}",
                delete(|Path(cust): Path<String>| async move {
                    Json(json!({ "DELCUS": { "COMM_CUSTNO": cust, "COMM_DEL_FAIL_CD": 0 } }))
                }),
            );
        let gateway = backend(router).await;

        let outcomes = vec![
            gateway
                .lookup::<AccountEnquiryEnvelope>(Operation::EnquireAccount, "12345678")
                .await,
            gateway
                .lookup::<CustomerEnquiryEnvelope>(Operation::EnquireCustomer, "42")
                .await,
            gateway
                .lookup::<AccountListEnvelope>(Operation::ListAccounts, "42")
                .await,
            gateway
                .submit::<CreateAccountEnvelope, _>(
                    Operation::CreateAccount,
                    &json!({ "CREACC": { "COMM_CUSTNO": "0000000042", "COMM_ACC_TYPE": "ISA" } }),
                )
                .await,
            gateway
                .submit::<CreateCustomerEnvelope, _>(
                    Operation::CreateCustomer,
                    &json!({ "CRECUST": { "COMM_NAME": "Dr Ada Lovelace" } }),
                )
                .await,
            gateway
                .submit::<UpdateAccountEnvelope, _>(
                    Operation::UpdateAccount,
                    &json!({ "UPDACC": { "COMM_ACCNO": "00000011", "COMM_ACC_TYPE": "LOAN" } }),
                )
                .await,
            gateway
                .submit::<UpdateCustomerEnvelope, _>(
                    Operation::UpdateCustomer,
                    &json!({ "UPDCUST": { "COMM_CUSTNO": "0000000042", "COMM_NAME": "Mrs Jo Bloggs" } }),
                )
                .await,
            gateway
                .lookup::<DeleteAccountEnvelope>(Operation::DeleteAccount, "11")
                .await,
            gateway
                .lookup::<DeleteCustomerEnvelope>(Operation::DeleteCustomer, "42")
                .await,
        ];

        for (operation, outcome) in Operation::ALL.iter().zip(&outcomes) {
            assert_eq!(outcome.kind, OutcomeKind::Success, "{operation:?}: {outcome:?}");
            assert!(!outcome.detail.is_empty(), "{operation:?} has no detail");
        }
        assert_eq!(outcomes[0].title, "Account Details:");
        assert!(outcomes[0].detail.contains("Account Number: 12345678"));
        assert!(outcomes[1].detail.contains("Name: Mr Jo Bloggs"));
        assert_eq!(outcomes[2].title, "Accounts belonging to customer 42:");
        assert_eq!(outcomes[2].rows.as_ref().map(Vec::len), Some(1));
        assert!(outcomes[3].detail.starts_with("Details: Account Number: 99"));
        assert!(outcomes[4].detail.contains("Customer Number: 77"));
        assert!(outcomes[5].detail.contains("Account Type: LOAN"));
        assert!(outcomes[6].detail.contains("Name: Mrs Jo Bloggs"));
        assert_eq!(outcomes[7].title, "Account Deleted");
        // The padded key reaches the backend and comes back in the commarea.
        assert!(outcomes[8].detail.contains("Customer Number: 42"));
    }

    #[tokio::test]
    async fn connection_refused_is_a_connection_error() {
        let gateway = unreachable().await;

        for operation in Operation::ALL {
            let outcome = match operation {
                Operation::CreateAccount => {
                    gateway
                        .submit::<CreateAccountEnvelope, _>(operation, &json!({}))
                        .await
                }
                Operation::CreateCustomer => {
                    gateway
                        .submit::<CreateCustomerEnvelope, _>(operation, &json!({}))
                        .await
                }
                Operation::UpdateAccount => {
                    gateway
                        .submit::<UpdateAccountEnvelope, _>(operation, &json!({}))
                        .await
                }
                Operation::UpdateCustomer => {
                    gateway
                        .submit::<UpdateCustomerEnvelope, _>(operation, &json!({}))
                        .await
                }
                _ => gateway.lookup::<DeleteAccountEnvelope>(operation, "1").await,
            };
            assert_eq!(outcome.kind, OutcomeKind::ConnectionError, "{operation:?}");
            assert_eq!(outcome.detail, CONNECTION_ERROR_MESSAGE);
            assert_eq!(
                outcome.title,
                operation.descriptor().connection_title,
                "{operation:?}"
            );
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_request_error() {
        let raw = "<html>CICS abend ASRA</html>";
        let gateway = backend(Router::new().route(
            "/inqcustz/enquiry/{cust}",
            get(move || async move { raw }),
        ))
        .await;

        let outcome = gateway
            .lookup::<CustomerEnquiryEnvelope>(Operation::EnquireCustomer, "1")
            .await;
        assert_eq!(outcome.kind, OutcomeKind::RequestError);
        assert_eq!(outcome.title, "Request Error");
        assert_eq!(outcome.detail, REQUEST_ERROR_MESSAGE);
        assert!(!outcome.detail.contains("ASRA"));
    }

    #[tokio::test]
    async fn shape_mismatch_is_a_request_error() {
        let gateway = backend(Router::new().route(
            "/inqaccz/enquiry/{acct}",
            get(|| async { Json(json!({ "SOMETHING_ELSE": {} })) }),
        ))
        .await;

        let outcome = gateway
            .lookup::<AccountEnquiryEnvelope>(Operation::EnquireAccount, "1")
            .await;
        assert_eq!(outcome.kind, OutcomeKind::RequestError);
    }

    #[tokio::test]
    async fn error_status_is_a_request_error() {
        let gateway = backend(Router::new().route(
            "/updacc/update",
            put(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;

        let outcome = gateway
            .submit::<UpdateAccountEnvelope, _>(Operation::UpdateAccount, &json!({}))
            .await;
        assert_eq!(outcome.kind, OutcomeKind::RequestError);
        assert_eq!(outcome.detail, REQUEST_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_fail_codes_never_succeed() {
        let gateway = backend(
            Router::new()
                .route(
                    "/crecust/insert",
                    post(|| async { Json(json!({ "CRECUST": { "COMM_FAIL_CODE": "9" } })) }),
                )
                .route(
                    "/updcust/update",
                    put(|| async {
                        Json(json!({ "UPDCUST": { "COMM_UPD_SUCCESS": "N", "COMM_UPD_FAIL_CD": "9" } }))
                    }),
                ),
        )
        .await;

        let created = gateway
            .submit::<CreateCustomerEnvelope, _>(Operation::CreateCustomer, &json!({}))
            .await;
        assert_eq!(created.kind, OutcomeKind::UnexpectedError);
        assert_eq!(created.title, "Request Error");
        assert_eq!(created.detail, REQUEST_ERROR_MESSAGE);

        let updated = gateway
            .submit::<UpdateCustomerEnvelope, _>(Operation::UpdateCustomer, &json!({}))
            .await;
        assert_eq!(updated.kind, OutcomeKind::NotFound);
        assert_eq!(updated.title, "Update Error");
    }

    #[tokio::test]
    async fn timeout_is_a_connection_error() {
        let router = Router::new().route(
            "/inqaccz/enquiry/{acct}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "INQACC_COMMAREA": { "INQACC_SUCCESS": "Y" } }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let gateway = Gateway::new(&base, Duration::from_millis(200)).unwrap();

        let outcome = gateway
            .lookup::<AccountEnquiryEnvelope>(Operation::EnquireAccount, "1")
            .await;
        assert_eq!(outcome.kind, OutcomeKind::ConnectionError);
    }
}
