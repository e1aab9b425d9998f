//! Customer page handlers.
//!
//! - GET/POST /enqcust - Enquire on a customer
//! - GET/POST /createcust - Create a customer
//! - GET/POST /updatecust - Update a customer's name and address
//! - GET/POST /delcust - Delete a customer and all of their accounts

use axum::{Form, extract::State, response::Html};
use chrono::Utc;

use crate::{
    error::AppError,
    models::customer::{
        CreateCustomerEnvelope, CreateCustomerForm, CustomerEnquiryEnvelope, CustomerNumberForm,
        DeleteCustomerEnvelope, UpdateCustomerEnvelope, UpdateCustomerForm,
    },
    routes::AppState,
    services::gateway::Operation,
};

pub async fn show_enquire_customer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::EnquireCustomer,
        &CustomerNumberForm::default(),
        None,
        None,
    )
}

/// Enquire on a customer.
///
/// # Backend Call
///
/// `GET /inqcustz/enquiry/{cust_number}`
pub async fn enquire_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerNumberForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::EnquireCustomer;
    let number = match form.validate() {
        Ok(number) => number,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .lookup::<CustomerEnquiryEnvelope>(operation, &number)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

pub async fn show_create_customer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::CreateCustomer,
        &CreateCustomerForm::default(),
        None,
        None,
    )
}

/// Create a customer.
///
/// # Backend Call
///
/// `POST /crecust/insert` with a `CRECUST` body. Any non-empty fail-code is
/// reported as an unexpected error.
pub async fn create_customer(
    State(state): State<AppState>,
    Form(form): Form<CreateCustomerForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::CreateCustomer;
    let today = Utc::now().date_naive();
    let request = match form.validate(&state.config.sort_code, today) {
        Ok(request) => request,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .submit::<CreateCustomerEnvelope, _>(operation, &request)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

pub async fn show_update_customer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::UpdateCustomer,
        &UpdateCustomerForm::default(),
        None,
        None,
    )
}

/// Update a customer's name and/or address.
///
/// # Backend Call
///
/// `PUT /updcust/update` with an `UPDCUST` body. Fail-codes `4` (nothing to
/// update) and `T` (bad title) are reported before the generic "not found".
pub async fn update_customer(
    State(state): State<AppState>,
    Form(form): Form<UpdateCustomerForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::UpdateCustomer;
    let request = match form.validate(&state.config.sort_code) {
        Ok(request) => request,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .submit::<UpdateCustomerEnvelope, _>(operation, &request)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

pub async fn show_delete_customer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::DeleteCustomer,
        &CustomerNumberForm::default(),
        None,
        None,
    )
}

/// Delete a customer and every account they own.
///
/// # Backend Call
///
/// `DELETE /delcus/remove/{cust_number}`, with the number zero-padded to 10 digits.
pub async fn delete_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerNumberForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::DeleteCustomer;
    let number = match form.validate() {
        Ok(number) => number,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .lookup::<DeleteCustomerEnvelope>(operation, &number)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}
