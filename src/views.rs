//! HTML pages.
//!
//! Templates are compiled into the binary and rendered with `minijinja`.
//! All nine operation pages share `form.html`; each page is described by a
//! list of fields, the submitted values and (after a POST) the outcome.

use axum::response::Html;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{account::AccountType, outcome::Outcome, validation::ValidationErrors},
    services::gateway::Operation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Date,
    AccountType,
}

struct FieldSpec {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind }
}

const ACCOUNT_NUMBER: FieldSpec = field("acct_number", "Account number", FieldKind::Text);
const CUSTOMER_NUMBER: FieldSpec = field("cust_number", "Customer number", FieldKind::Text);
const ACCOUNT_TYPE: FieldSpec = field("account_type", "Account type", FieldKind::AccountType);
const INTEREST_RATE: FieldSpec = field("interest_rate", "Interest rate", FieldKind::Text);
const OVERDRAFT_LIMIT: FieldSpec = field("overdraft_limit", "Overdraft limit", FieldKind::Text);
const CUSTOMER_NAME: FieldSpec = field("cust_name", "Name", FieldKind::Text);
const CUSTOMER_ADDRESS: FieldSpec = field("cust_address", "Address", FieldKind::Text);
const CUSTOMER_TITLE: FieldSpec = field("cust_title", "Title", FieldKind::Text);
const DATE_OF_BIRTH: FieldSpec = field("date_of_birth", "Date of birth", FieldKind::Date);

/// Static layout of one operation page.
struct PageSpec {
    heading: &'static str,
    action: &'static str,
    submit_label: &'static str,
    fields: &'static [FieldSpec],
}

const fn page(
    heading: &'static str,
    action: &'static str,
    submit_label: &'static str,
    fields: &'static [FieldSpec],
) -> PageSpec {
    PageSpec {
        heading,
        action,
        submit_label,
        fields,
    }
}

fn page_spec(operation: Operation) -> PageSpec {
    match operation {
        Operation::EnquireAccount => page("Enquire Account", "/enqacct", "Enquire", &[ACCOUNT_NUMBER]),
        Operation::EnquireCustomer => {
            page("Enquire Customer", "/enqcust", "Enquire", &[CUSTOMER_NUMBER])
        }
        Operation::ListAccounts => page(
            "List Accounts Belonging to a Customer",
            "/listacc",
            "List accounts",
            &[CUSTOMER_NUMBER],
        ),
        Operation::CreateAccount => page(
            "Create Account",
            "/createacc",
            "Create",
            &[CUSTOMER_NUMBER, ACCOUNT_TYPE, INTEREST_RATE, OVERDRAFT_LIMIT],
        ),
        Operation::CreateCustomer => page(
            "Create Customer",
            "/createcust",
            "Create",
            &[CUSTOMER_TITLE, CUSTOMER_NAME, CUSTOMER_ADDRESS, DATE_OF_BIRTH],
        ),
        Operation::UpdateAccount => page(
            "Update Account",
            "/updateacc",
            "Update",
            &[ACCOUNT_NUMBER, ACCOUNT_TYPE, INTEREST_RATE, OVERDRAFT_LIMIT],
        ),
        Operation::UpdateCustomer => page(
            "Update Customer",
            "/updatecust",
            "Update",
            &[CUSTOMER_NUMBER, CUSTOMER_NAME, CUSTOMER_ADDRESS],
        ),
        Operation::DeleteAccount => page("Delete Account", "/delacct", "Delete", &[ACCOUNT_NUMBER]),
        Operation::DeleteCustomer => page(
            "Delete Customer and Associated Accounts",
            "/delcust",
            "Delete",
            &[CUSTOMER_NUMBER],
        ),
    }
}

/// One input as handed to the template.
#[derive(Debug, Serialize)]
struct FieldView {
    name: &'static str,
    label: &'static str,
    kind: &'static str,
    value: String,
    options: Vec<&'static str>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Link {
    href: &'static str,
    label: &'static str,
}

/// Compiled page templates.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../templates/layout.html"))?;
        env.add_template("services.html", include_str!("../templates/services.html"))?;
        env.add_template("form.html", include_str!("../templates/form.html"))?;
        Ok(Self { env })
    }

    /// The services menu linking every operation page.
    pub fn services(&self) -> Result<Html<String>, AppError> {
        let links: Vec<Link> = Operation::ALL
            .iter()
            .map(|&operation| {
                let spec = page_spec(operation);
                Link {
                    href: spec.action,
                    label: spec.heading,
                }
            })
            .collect();
        let html = self
            .env
            .get_template("services.html")?
            .render(context! { links })?;
        Ok(Html(html))
    }

    /// Render an operation page.
    ///
    /// `values` is the submitted form (or its default for an empty page);
    /// `outcome` fills the results panel after a completed call.
    pub fn form<F: Serialize>(
        &self,
        operation: Operation,
        values: &F,
        errors: Option<&ValidationErrors>,
        outcome: Option<&Outcome>,
    ) -> Result<Html<String>, AppError> {
        let spec = page_spec(operation);
        let values = serde_json::to_value(values)?;

        let fields: Vec<FieldView> = spec
            .fields
            .iter()
            .map(|field| FieldView {
                name: field.name,
                label: field.label,
                kind: match field.kind {
                    FieldKind::Text => "text",
                    FieldKind::Date => "date",
                    FieldKind::AccountType => "select",
                },
                value: values
                    .get(field.name)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                options: match field.kind {
                    FieldKind::AccountType => AccountType::ALL.iter().map(|t| t.as_str()).collect(),
                    _ => Vec::new(),
                },
                error: errors
                    .and_then(|e| e.for_field(field.name))
                    .map(str::to_string),
            })
            .collect();

        let html = self.env.get_template("form.html")?.render(context! {
            heading => spec.heading,
            action => spec.action,
            submit_label => spec.submit_label,
            fields,
            outcome,
        })?;
        Ok(Html(html))
    }
}
