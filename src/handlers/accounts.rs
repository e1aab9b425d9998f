//! Account page handlers.
//!
//! This module implements the account pages:
//! - GET/POST /enqacct - Enquire on an account
//! - GET/POST /listacc - List the accounts belonging to a customer
//! - GET/POST /createacc - Create an account
//! - GET/POST /updateacc - Update an account
//! - GET/POST /delacct - Delete an account
//!
//! Every POST validates the form, makes one backend call through the
//! gateway and re-renders the same page with the outcome, so another
//! request can be made without navigating away.

use axum::{Form, extract::State, response::Html};

use crate::{
    error::AppError,
    models::{
        account::{
            AccountEnquiryEnvelope, AccountListEnvelope, AccountNumberForm, CreateAccountEnvelope,
            CreateAccountForm, DeleteAccountEnvelope, UpdateAccountEnvelope, UpdateAccountForm,
        },
        customer::CustomerNumberForm,
    },
    routes::AppState,
    services::gateway::Operation,
};

/// Empty account enquiry form.
pub async fn show_enquire_account(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::EnquireAccount,
        &AccountNumberForm::default(),
        None,
        None,
    )
}

/// Enquire on an account.
///
/// # Form Fields
///
/// - `acct_number` - up to 8 digits
///
/// # Backend Call
///
/// `GET /inqaccz/enquiry/{acct_number}`
pub async fn enquire_account(
    State(state): State<AppState>,
    Form(form): Form<AccountNumberForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::EnquireAccount;
    let number = match form.validate() {
        Ok(number) => number,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .lookup::<AccountEnquiryEnvelope>(operation, &number)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

/// Empty "list accounts" form.
pub async fn show_list_accounts(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::ListAccounts,
        &CustomerNumberForm::default(),
        None,
        None,
    )
}

/// List every account belonging to a customer.
///
/// # Backend Call
///
/// `GET /inqacccz/list/{cust_number}`
///
/// The result panel shows a table of accounts instead of a detail string.
pub async fn list_accounts(
    State(state): State<AppState>,
    Form(form): Form<CustomerNumberForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::ListAccounts;
    let number = match form.validate() {
        Ok(number) => number,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .lookup::<AccountListEnvelope>(operation, &number)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

/// Empty create account form.
pub async fn show_create_account(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::CreateAccount,
        &CreateAccountForm::default(),
        None,
        None,
    )
}

/// Create an account for an existing customer.
///
/// # Form Fields
///
/// - `cust_number` - owning customer
/// - `account_type` - ISA, MORTGAGE, SAVING, CURRENT or LOAN
/// - `interest_rate` - e.g. `1.50`
/// - `overdraft_limit` - whole amount
///
/// # Backend Call
///
/// `POST /creacc/insert` with a `CREACC` body. Fail-codes `1`, `8` and `A`
/// are reported as "customer not found", "too many accounts" and "invalid
/// account type".
pub async fn create_account(
    State(state): State<AppState>,
    Form(form): Form<CreateAccountForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::CreateAccount;
    let request = match form.validate(&state.config.sort_code) {
        Ok(request) => request,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .submit::<CreateAccountEnvelope, _>(operation, &request)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

/// Empty update account form.
pub async fn show_update_account(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::UpdateAccount,
        &UpdateAccountForm::default(),
        None,
        None,
    )
}

/// Update an account's type, interest rate and overdraft limit.
///
/// # Backend Call
///
/// `PUT /updacc/update` with an `UPDACC` body.
pub async fn update_account(
    State(state): State<AppState>,
    Form(form): Form<UpdateAccountForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::UpdateAccount;
    let request = match form.validate(&state.config.sort_code) {
        Ok(request) => request,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .submit::<UpdateAccountEnvelope, _>(operation, &request)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}

/// Empty delete account form.
pub async fn show_delete_account(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.form(
        Operation::DeleteAccount,
        &AccountNumberForm::default(),
        None,
        None,
    )
}

/// Delete an account.
///
/// # Backend Call
///
/// `DELETE /delacc/remove/{acct_number}`
///
/// Not safely repeatable on the backend; the gateway sends it once and never retries.
pub async fn delete_account(
    State(state): State<AppState>,
    Form(form): Form<AccountNumberForm>,
) -> Result<Html<String>, AppError> {
    let operation = Operation::DeleteAccount;
    let number = match form.validate() {
        Ok(number) => number,
        Err(errors) => return state.views.form(operation, &form, Some(&errors), None),
    };

    let outcome = state
        .gateway
        .lookup::<DeleteAccountEnvelope>(operation, &number)
        .await;
    state.views.form(operation, &form, None, Some(&outcome))
}
