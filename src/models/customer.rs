//! Customer forms and customer commarea envelopes.
//!
//! This module defines:
//! - Form types for the customer pages (enquire, list, create, update, delete)
//! - Envelopes for `INQCUSTZ`, `CRECUST`, `UPDCUST` and `DELCUS`

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{
    account::CUSTOMER_NUMBER_DIGITS,
    commarea::{Details, Envelope, RecordKey, flag_is, format_date, lenient_string, unpadded},
    outcome::{Failure, Item},
    validation::{self, ValidationErrors},
};

pub const MAX_NAME_LEN: usize = 60;
pub const MAX_ADDRESS_LEN: usize = 160;
pub const MAX_TITLE_LEN: usize = 10;

/// Form carrying only a customer number (enquire, list accounts, delete).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerNumberForm {
    #[serde(default)]
    pub cust_number: String,
}

impl CustomerNumberForm {
    /// The customer number as entered, trimmed.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let number = validation::digits(
            &mut errors,
            "cust_number",
            &self.cust_number,
            CUSTOMER_NUMBER_DIGITS,
        );
        errors.finish(number)
    }
}

/// Create customer form.
///
/// The title is sent as the first word of `COMM_NAME`; the backend decides
/// whether it is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCustomerForm {
    #[serde(default)]
    pub cust_title: String,
    #[serde(default)]
    pub cust_name: String,
    #[serde(default)]
    pub cust_address: String,
    /// `YYYY-MM-DD`, as produced by an HTML date input
    #[serde(default)]
    pub date_of_birth: String,
}

impl CreateCustomerForm {
    /// Validate the form and render it into the `CRECUST` request body.
    ///
    /// `today` bounds the date of birth.
    pub fn validate(
        &self,
        sort_code: &str,
        today: NaiveDate,
    ) -> Result<CreateCustomerEnvelope, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = validation::text(&mut errors, "cust_title", &self.cust_title, MAX_TITLE_LEN);
        let name = validation::text(&mut errors, "cust_name", &self.cust_name, MAX_NAME_LEN);
        let address = validation::text(
            &mut errors,
            "cust_address",
            &self.cust_address,
            MAX_ADDRESS_LEN,
        );

        // COMM_NAME holds the title and name together.
        if !title.is_empty() && !name.is_empty() {
            let combined = title.chars().count() + 1 + name.chars().count();
            if combined > MAX_NAME_LEN && errors.for_field("cust_name").is_none() {
                errors.add(
                    "cust_name",
                    format!("must be at most {MAX_NAME_LEN} characters including the title"),
                );
            }
        }

        let date_of_birth = match NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d") {
            Ok(date) if date > today => {
                errors.add("date_of_birth", "must not be in the future");
                0
            }
            Ok(date) if date.year() < 1 => {
                errors.add("date_of_birth", "must be in year 1 or later");
                0
            }
            Ok(date) => commarea_date(date),
            Err(_) => {
                errors.add("date_of_birth", "must be a date in YYYY-MM-DD form");
                0
            }
        };

        let envelope = CreateCustomerEnvelope {
            commarea: CreateCustomer {
                eyecatcher: "CUST".to_string(),
                key: RecordKey {
                    sort_code: sort_code.to_string(),
                    number: "0".to_string(),
                },
                name: format!("{title} {name}"),
                address,
                date_of_birth,
                ..CreateCustomer::default()
            },
        };
        errors.finish(envelope)
    }
}

/// `DDMMYYYY` as the backend stores dates. Only called for CE years.
fn commarea_date(date: NaiveDate) -> u32 {
    let (_, year) = date.year_ce();
    date.day() * 1_000_000 + date.month() * 10_000 + year
}

/// Update customer form.
///
/// Name and address may be left blank; the backend rejects a request with
/// neither (fail-code `4`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerForm {
    #[serde(default)]
    pub cust_number: String,
    #[serde(default)]
    pub cust_name: String,
    #[serde(default)]
    pub cust_address: String,
}

impl UpdateCustomerForm {
    /// Validate the form and render it into the `UPDCUST` request body.
    pub fn validate(&self, sort_code: &str) -> Result<UpdateCustomerEnvelope, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let number = validation::identifier(
            &mut errors,
            "cust_number",
            &self.cust_number,
            CUSTOMER_NUMBER_DIGITS,
        );
        let name = validation::optional_text(&mut errors, "cust_name", &self.cust_name, MAX_NAME_LEN);
        let address = validation::optional_text(
            &mut errors,
            "cust_address",
            &self.cust_address,
            MAX_ADDRESS_LEN,
        );

        let envelope = UpdateCustomerEnvelope {
            commarea: UpdateCustomer {
                customer: CustomerRecord {
                    eyecatcher: "CUST".to_string(),
                    sort_code: sort_code.to_string(),
                    customer_number: format!("{number:010}"),
                    name,
                    address,
                    ..CustomerRecord::default()
                },
                success: " ".to_string(),
                fail_code: " ".to_string(),
            },
        };
        errors.finish(envelope)
    }
}

/// Customer fields shared by the `COMM_*` customer commareas (update and delete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "COMM_EYE", default)]
    pub eyecatcher: String,
    #[serde(rename = "COMM_SCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,
    #[serde(rename = "COMM_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "COMM_NAME", default)]
    pub name: String,
    #[serde(rename = "COMM_ADDR", default)]
    pub address: String,
    #[serde(rename = "COMM_DOB", default)]
    pub date_of_birth: u32,
    #[serde(rename = "COMM_CREDIT_SCORE", default)]
    pub credit_score: u32,
    #[serde(rename = "COMM_CS_REVIEW_DATE", default)]
    pub credit_score_review: u32,
}

impl CustomerRecord {
    fn details(&self) -> String {
        customer_details(
            &self.customer_number,
            &self.sort_code,
            &self.name,
            &self.address,
            self.date_of_birth,
            self.credit_score,
            self.credit_score_review,
        )
    }
}

fn customer_details(
    number: &str,
    sort_code: &str,
    name: &str,
    address: &str,
    date_of_birth: u32,
    credit_score: u32,
    review: u32,
) -> String {
    Details::new()
        .field("Customer Number", unpadded(number))
        .field("Sort Code", sort_code.trim())
        .field("Name", name.trim())
        .field("Address", address.trim())
        .field("Date of Birth", format_date(date_of_birth))
        .field("Credit Score", credit_score)
        .field("Credit Score Review Date", format_date(review))
        .finish()
}

/// Response of the customer enquiry (`GET /inqcustz/enquiry/{cust}`).
///
/// # JSON Example
///
/// ```json
/// {
///   "INQCUSTZ": {
///     "INQCUST_CUSTNO": "0000000042",
///     "INQCUST_NAME": "Mr Jo Bloggs",
///     "INQCUST_INQ_SUCCESS": "Y"
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerEnquiryEnvelope {
    #[serde(rename = "INQCUSTZ")]
    pub commarea: CustomerEnquiry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerEnquiry {
    #[serde(rename = "INQCUST_SCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,
    #[serde(rename = "INQCUST_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "INQCUST_NAME", default)]
    pub name: String,
    #[serde(rename = "INQCUST_ADDR", default)]
    pub address: String,
    #[serde(rename = "INQCUST_DOB", default)]
    pub date_of_birth: u32,
    #[serde(rename = "INQCUST_CREDIT_SCORE", default)]
    pub credit_score: u32,
    #[serde(rename = "INQCUST_CS_REVIEW_DT", default)]
    pub credit_score_review: u32,
    #[serde(rename = "INQCUST_INQ_SUCCESS")]
    pub success: String,
}

impl Envelope for CustomerEnquiryEnvelope {
    fn check(&self) -> Result<(), Failure> {
        if flag_is(&self.commarea.success, "N") {
            return Err(Failure::NotFound(Item::Customer));
        }
        Ok(())
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        customer_details(
            &area.customer_number,
            &area.sort_code,
            &area.name,
            &area.address,
            area.date_of_birth,
            area.credit_score,
            area.credit_score_review,
        )
    }
}

/// Request and response body of customer creation (`POST /crecust/insert`).
///
/// Success is signalled by an empty fail-code alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerEnvelope {
    #[serde(rename = "CRECUST")]
    pub commarea: CreateCustomer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCustomer {
    #[serde(rename = "COMM_EYECATCHER", default)]
    pub eyecatcher: String,
    #[serde(rename = "COMM_KEY", default)]
    pub key: RecordKey,
    #[serde(rename = "COMM_NAME", default)]
    pub name: String,
    #[serde(rename = "COMM_ADDRESS", default)]
    pub address: String,
    #[serde(rename = "COMM_DATE_OF_BIRTH", default)]
    pub date_of_birth: u32,
    #[serde(rename = "COMM_CREDIT_SCORE", default)]
    pub credit_score: u32,
    #[serde(rename = "COMM_CS_REVIEW_DATE", default)]
    pub credit_score_review: u32,
    #[serde(rename = "COMM_SUCCESS", default)]
    pub success: String,
    #[serde(rename = "COMM_FAIL_CODE", default, deserialize_with = "lenient_string")]
    pub fail_code: String,
}

impl Envelope for CreateCustomerEnvelope {
    fn check(&self) -> Result<(), Failure> {
        match self.commarea.fail_code.trim() {
            "" => Ok(()),
            code => Err(Failure::unexpected(code)),
        }
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        customer_details(
            &area.key.number,
            &area.key.sort_code,
            &area.name,
            &area.address,
            area.date_of_birth,
            area.credit_score,
            area.credit_score_review,
        )
    }
}

/// Request and response body of a customer update (`PUT /updcust/update`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCustomerEnvelope {
    #[serde(rename = "UPDCUST")]
    pub commarea: UpdateCustomer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCustomer {
    #[serde(flatten)]
    pub customer: CustomerRecord,
    #[serde(rename = "COMM_UPD_SUCCESS")]
    pub success: String,
    #[serde(rename = "COMM_UPD_FAIL_CD", default, deserialize_with = "lenient_string")]
    pub fail_code: String,
}

impl Envelope for UpdateCustomerEnvelope {
    fn check(&self) -> Result<(), Failure> {
        let area = &self.commarea;
        if !flag_is(&area.success, "N") {
            return Ok(());
        }
        // Specific codes take precedence; anything else means the customer is missing.
        match area.fail_code.trim() {
            "4" => Err(Failure::InvalidArgument(
                "No name and no address supplied. (Are there spaces before both the name and the address?)",
            )),
            "T" => Err(Failure::InvalidArgument(
                "Invalid title; Valid titles are: Professor, Mr, Mrs, Miss, Ms, Dr, Drs, Lord, Sir or Lady.",
            )),
            _ => Err(Failure::NotFound(Item::Customer)),
        }
    }

    fn details(&self) -> String {
        self.commarea.customer.details()
    }
}

/// Response of a customer deletion (`DELETE /delcus/remove/{cust}`).
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCustomerEnvelope {
    #[serde(rename = "DELCUS")]
    pub commarea: DeleteCustomer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCustomer {
    #[serde(flatten)]
    pub customer: CustomerRecord,
    #[serde(rename = "COMM_DEL_FAIL_CD", default, deserialize_with = "lenient_string")]
    pub delete_fail_code: String,
}

impl Envelope for DeleteCustomerEnvelope {
    fn check(&self) -> Result<(), Failure> {
        match self.commarea.delete_fail_code.trim() {
            "" | "0" => Ok(()),
            "1" => Err(Failure::NotFound(Item::Customer)),
            other => Err(Failure::unexpected(other)),
        }
    }

    fn details(&self) -> String {
        self.commarea.customer.details()
    }
}
