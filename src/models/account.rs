//! Account forms and account commarea envelopes.
//!
//! This module defines:
//! - `AccountType`: the account kinds the backend accepts
//! - Form types for the account pages (enquire, create, update, delete)
//! - Envelopes for `INQACC_COMMAREA`, `INQACCCZ`, `CREACC`, `UPDACC` and `DELACC_COMMAREA`
//! - `AccountRow`: one line of the "list accounts" table

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::{
    commarea::{
        Details, Envelope, RecordKey, flag_is, format_date, format_money, is_zero_id,
        lenient_string, unpadded,
    },
    outcome::{Failure, Item, Outcome},
    validation::{self, ValidationErrors},
};

/// Longest account number the backend stores.
pub const ACCOUNT_NUMBER_DIGITS: usize = 8;
/// Longest customer number the backend stores.
pub const CUSTOMER_NUMBER_DIGITS: usize = 10;
/// Highest interest rate the commarea can carry.
pub const MAX_INTEREST_RATE: f64 = 9999.99;

/// Account kinds offered on the create/update pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Isa,
    Mortgage,
    Saving,
    Current,
    Loan,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Isa,
        AccountType::Mortgage,
        AccountType::Saving,
        AccountType::Current,
        AccountType::Loan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Isa => "ISA",
            AccountType::Mortgage => "MORTGAGE",
            AccountType::Saving => "SAVING",
            AccountType::Current => "CURRENT",
            AccountType::Loan => "LOAN",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

fn account_type(errors: &mut ValidationErrors, raw: &str) -> Option<AccountType> {
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        errors.add(
            "account_type",
            "must be one of ISA, MORTGAGE, SAVING, CURRENT or LOAN",
        );
    }
    parsed
}

/// Form carrying only an account number (enquire and delete).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountNumberForm {
    #[serde(default)]
    pub acct_number: String,
}

impl AccountNumberForm {
    /// The account number as entered, trimmed.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let number = validation::digits(
            &mut errors,
            "acct_number",
            &self.acct_number,
            ACCOUNT_NUMBER_DIGITS,
        );
        errors.finish(number)
    }
}

/// Create account form.
///
/// # Validation
///
/// - `cust_number`: required, up to 10 digits
/// - `account_type`: one of [`AccountType::ALL`]
/// - `interest_rate`: 0 to 9999.99, two decimal places
/// - `overdraft_limit`: whole amount, 0 or more
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAccountForm {
    #[serde(default)]
    pub cust_number: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub overdraft_limit: String,
}

impl CreateAccountForm {
    /// Validate the form and render it into the `CREACC` request body.
    pub fn validate(&self, sort_code: &str) -> Result<CreateAccountEnvelope, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let customer = validation::identifier(
            &mut errors,
            "cust_number",
            &self.cust_number,
            CUSTOMER_NUMBER_DIGITS,
        );
        let kind = account_type(&mut errors, &self.account_type);
        let rate =
            validation::rate(&mut errors, "interest_rate", &self.interest_rate, MAX_INTEREST_RATE);
        let overdraft = validation::amount(&mut errors, "overdraft_limit", &self.overdraft_limit);

        let envelope = CreateAccountEnvelope {
            commarea: CreateAccount {
                eyecatcher: "ACCT".to_string(),
                customer_number: format!("{customer:010}"),
                key: RecordKey {
                    sort_code: sort_code.to_string(),
                    number: "0".to_string(),
                },
                account_type: kind.map(|t| t.to_string()).unwrap_or_default(),
                interest_rate: rate,
                overdraft_limit: overdraft,
                success: " ".to_string(),
                fail_code: " ".to_string(),
                ..CreateAccount::default()
            },
        };
        errors.finish(envelope)
    }
}

/// Update account form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountForm {
    #[serde(default)]
    pub acct_number: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub overdraft_limit: String,
}

impl UpdateAccountForm {
    /// Validate the form and render it into the `UPDACC` request body.
    pub fn validate(&self, sort_code: &str) -> Result<UpdateAccountEnvelope, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let number = validation::identifier(
            &mut errors,
            "acct_number",
            &self.acct_number,
            ACCOUNT_NUMBER_DIGITS,
        );
        let kind = account_type(&mut errors, &self.account_type);
        let rate =
            validation::rate(&mut errors, "interest_rate", &self.interest_rate, MAX_INTEREST_RATE);
        let overdraft = validation::amount(&mut errors, "overdraft_limit", &self.overdraft_limit);

        let envelope = UpdateAccountEnvelope {
            commarea: UpdateAccount {
                account: AccountRecord {
                    eyecatcher: "ACCT".to_string(),
                    sort_code: sort_code.to_string(),
                    account_number: format!("{number:08}"),
                    account_type: kind.map(|t| t.to_string()).unwrap_or_default(),
                    interest_rate: rate,
                    overdraft_limit: overdraft,
                    ..AccountRecord::default()
                },
                success: " ".to_string(),
            },
        };
        errors.finish(envelope)
    }
}

/// Account fields shared by the `COMM_*` account commareas (list rows and update).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "COMM_EYE", default)]
    pub eyecatcher: String,
    #[serde(rename = "COMM_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "COMM_SCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,
    #[serde(rename = "COMM_ACCNO", default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(rename = "COMM_ACC_TYPE", default)]
    pub account_type: String,
    #[serde(rename = "COMM_INT_RATE", default)]
    pub interest_rate: f64,
    #[serde(rename = "COMM_OPENED", default)]
    pub opened: u32,
    #[serde(rename = "COMM_OVERDRAFT", default)]
    pub overdraft_limit: u32,
    #[serde(rename = "COMM_LAST_STMT_DT", default)]
    pub last_statement: u32,
    #[serde(rename = "COMM_NEXT_STMT_DT", default)]
    pub next_statement: u32,
    #[serde(rename = "COMM_AVAIL_BAL", default)]
    pub available_balance: f64,
    #[serde(rename = "COMM_ACTUAL_BAL", default)]
    pub actual_balance: f64,
}

impl AccountRecord {
    fn details(&self) -> Details {
        Details::new()
            .field("Account Number", unpadded(&self.account_number))
            .field("Sort Code", self.sort_code.trim())
            .field("Customer Number", unpadded(&self.customer_number))
            .field("Account Type", self.account_type.trim())
            .field("Interest Rate", format_money(self.interest_rate))
            .field("Overdraft Limit", self.overdraft_limit)
            .field("Available Balance", format_money(self.available_balance))
            .field("Actual Balance", format_money(self.actual_balance))
            .field("Opened", format_date(self.opened))
            .field("Last Statement", format_date(self.last_statement))
            .field("Next Statement", format_date(self.next_statement))
    }
}

/// One line of the "list accounts" table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRow {
    pub account_number: String,
    pub sort_code: String,
    pub account_type: String,
    pub interest_rate: String,
    pub overdraft_limit: String,
    pub available_balance: String,
    pub actual_balance: String,
    pub opened: String,
}

impl From<&AccountRecord> for AccountRow {
    fn from(record: &AccountRecord) -> Self {
        Self {
            account_number: unpadded(&record.account_number),
            sort_code: record.sort_code.trim().to_string(),
            account_type: record.account_type.trim().to_string(),
            interest_rate: format_money(record.interest_rate),
            overdraft_limit: record.overdraft_limit.to_string(),
            available_balance: format_money(record.available_balance),
            actual_balance: format_money(record.actual_balance),
            opened: format_date(record.opened),
        }
    }
}

/// Response of the account enquiry (`GET /inqaccz/enquiry/{acct}`).
///
/// # JSON Example
///
/// ```json
/// {
///   "INQACC_COMMAREA": {
///     "INQACC_ACCNO": 12345678,
///     "INQACC_CUSTNO": 4455,
///     "INQACC_SUCCESS": "Y"
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AccountEnquiryEnvelope {
    #[serde(rename = "INQACC_COMMAREA")]
    pub commarea: AccountEnquiry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountEnquiry {
    #[serde(rename = "INQACC_EYE", default)]
    pub eyecatcher: String,
    #[serde(rename = "INQACC_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "INQACC_SCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,
    #[serde(rename = "INQACC_ACCNO", default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(rename = "INQACC_ACC_TYPE", default)]
    pub account_type: String,
    #[serde(rename = "INQACC_INT_RATE", default)]
    pub interest_rate: f64,
    #[serde(rename = "INQACC_OPENED", default)]
    pub opened: u32,
    #[serde(rename = "INQACC_OVERDRAFT", default)]
    pub overdraft_limit: u32,
    #[serde(rename = "INQACC_LAST_STMT_DT", default)]
    pub last_statement: u32,
    #[serde(rename = "INQACC_NEXT_STMT_DT", default)]
    pub next_statement: u32,
    #[serde(rename = "INQACC_AVAIL_BAL", default)]
    pub available_balance: f64,
    #[serde(rename = "INQACC_ACTUAL_BAL", default)]
    pub actual_balance: f64,
    #[serde(rename = "INQACC_SUCCESS")]
    pub success: String,
}

impl Envelope for AccountEnquiryEnvelope {
    fn check(&self) -> Result<(), Failure> {
        let area = &self.commarea;
        if flag_is(&area.success, "N") {
            if is_zero_id(&area.customer_number) {
                return Err(Failure::NotFound(Item::Account));
            }
            return Err(Failure::unexpected(format!(
                "INQACC_SUCCESS=N, INQACC_CUSTNO={}",
                area.customer_number
            )));
        }
        Ok(())
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        AccountRecord {
            eyecatcher: area.eyecatcher.clone(),
            customer_number: area.customer_number.clone(),
            sort_code: area.sort_code.clone(),
            account_number: area.account_number.clone(),
            account_type: area.account_type.clone(),
            interest_rate: area.interest_rate,
            opened: area.opened,
            overdraft_limit: area.overdraft_limit,
            last_statement: area.last_statement,
            next_statement: area.next_statement,
            available_balance: area.available_balance,
            actual_balance: area.actual_balance,
        }
        .details()
        .finish()
    }
}

/// Response of the customer's account list (`GET /inqacccz/list/{cust}`).
#[derive(Debug, Clone, Deserialize)]
pub struct AccountListEnvelope {
    #[serde(rename = "INQACCCZ")]
    pub commarea: AccountList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountList {
    #[serde(rename = "CUSTOMER_NUMBER", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "CUSTOMER_FOUND")]
    pub customer_found: String,
    #[serde(rename = "ACCOUNT_DETAILS", default)]
    pub accounts: Vec<AccountRecord>,
}

impl Envelope for AccountListEnvelope {
    fn check(&self) -> Result<(), Failure> {
        if flag_is(&self.commarea.customer_found, "N") {
            return Err(Failure::NotFound(Item::Customer));
        }
        Ok(())
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        Details::new()
            .field("Customer Number", unpadded(&area.customer_number))
            .field("Accounts", area.accounts.len())
            .finish()
    }

    /// The list page shows a table; the title carries the customer number.
    fn into_outcome(self, title: &str) -> Outcome {
        let customer = unpadded(&self.commarea.customer_number);
        let rows = self.commarea.accounts.iter().map(AccountRow::from).collect();
        Outcome::success(title.replace("{customer}", &customer), self.details()).with_rows(rows)
    }
}

/// Request and response body of account creation (`POST /creacc/insert`).
///
/// # JSON Example
///
/// ```json
/// {
///   "CREACC": {
///     "COMM_EYECATCHER": "ACCT",
///     "COMM_CUSTNO": "0000004455",
///     "COMM_KEY": { "COMM_SORTCODE": "987654", "COMM_NUMBER": "0" },
///     "COMM_ACC_TYPE": "ISA",
///     "COMM_INT_RT": 1.5,
///     "COMM_OVERDR_LIM": 0,
///     "COMM_SUCCESS": "Y",
///     "COMM_FAIL_CODE": " "
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountEnvelope {
    #[serde(rename = "CREACC")]
    pub commarea: CreateAccount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAccount {
    #[serde(rename = "COMM_EYECATCHER", default)]
    pub eyecatcher: String,
    #[serde(rename = "COMM_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "COMM_KEY", default)]
    pub key: RecordKey,
    #[serde(rename = "COMM_ACC_TYPE", default)]
    pub account_type: String,
    #[serde(rename = "COMM_INT_RT", default)]
    pub interest_rate: f64,
    #[serde(rename = "COMM_OPENED", default)]
    pub opened: u32,
    #[serde(rename = "COMM_OVERDR_LIM", default)]
    pub overdraft_limit: u32,
    #[serde(rename = "COMM_LAST_STMT_DT", default)]
    pub last_statement: u32,
    #[serde(rename = "COMM_NEXT_STMT_DT", default)]
    pub next_statement: u32,
    #[serde(rename = "COMM_AVAIL_BAL", default)]
    pub available_balance: f64,
    #[serde(rename = "COMM_ACT_BAL", default)]
    pub actual_balance: f64,
    #[serde(rename = "COMM_SUCCESS")]
    pub success: String,
    #[serde(rename = "COMM_FAIL_CODE", default, deserialize_with = "lenient_string")]
    pub fail_code: String,
}

impl Envelope for CreateAccountEnvelope {
    fn check(&self) -> Result<(), Failure> {
        let area = &self.commarea;
        if !flag_is(&area.success, "N") {
            return Ok(());
        }
        match area.fail_code.trim() {
            "1" => Err(Failure::NotFound(Item::Customer)),
            "8" => Err(Failure::TooManyAccounts {
                customer_number: unpadded(&area.customer_number),
            }),
            "A" => Err(Failure::InvalidArgument("Invalid account type supplied.")),
            other => Err(Failure::unexpected(other)),
        }
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        Details::new()
            .field("Account Number", unpadded(&area.key.number))
            .field("Sort Code", area.key.sort_code.trim())
            .field("Customer Number", unpadded(&area.customer_number))
            .field("Account Type", area.account_type.trim())
            .field("Interest Rate", format_money(area.interest_rate))
            .field("Overdraft Limit", area.overdraft_limit)
            .field("Available Balance", format_money(area.available_balance))
            .field("Actual Balance", format_money(area.actual_balance))
            .field("Opened", format_date(area.opened))
            .field("Next Statement", format_date(area.next_statement))
            .finish()
    }

    fn into_outcome(self, title: &str) -> Outcome {
        Outcome::success(title, format!("Details: {}", self.details()))
    }
}

/// Request and response body of an account update (`PUT /updacc/update`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAccountEnvelope {
    #[serde(rename = "UPDACC")]
    pub commarea: UpdateAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAccount {
    #[serde(flatten)]
    pub account: AccountRecord,
    #[serde(rename = "COMM_SUCCESS")]
    pub success: String,
}

impl Envelope for UpdateAccountEnvelope {
    fn check(&self) -> Result<(), Failure> {
        if flag_is(&self.commarea.success, "N") {
            return Err(Failure::NotFound(Item::Account));
        }
        Ok(())
    }

    fn details(&self) -> String {
        self.commarea.account.details().finish()
    }
}

/// Response of an account deletion (`DELETE /delacc/remove/{acct}`).
///
/// The deletion result lives in `DELACC_DEL_FAIL_CD`; a missing code reads as `0`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAccountEnvelope {
    #[serde(rename = "DELACC_COMMAREA")]
    pub commarea: DeleteAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAccount {
    #[serde(rename = "DELACC_CUSTNO", default, deserialize_with = "lenient_string")]
    pub customer_number: String,
    #[serde(rename = "DELACC_SCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,
    #[serde(rename = "DELACC_ACCNO", default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(rename = "DELACC_ACC_TYPE", default)]
    pub account_type: String,
    #[serde(rename = "DELACC_INT_RATE", default)]
    pub interest_rate: f64,
    #[serde(rename = "DELACC_OPENED", default)]
    pub opened: u32,
    #[serde(rename = "DELACC_OVERDRAFT", default)]
    pub overdraft_limit: u32,
    #[serde(rename = "DELACC_AVAIL_BAL", default)]
    pub available_balance: f64,
    #[serde(rename = "DELACC_ACTUAL_BAL", default)]
    pub actual_balance: f64,
    #[serde(rename = "DELACC_DEL_FAIL_CD", default, deserialize_with = "lenient_string")]
    pub delete_fail_code: String,
}

impl Envelope for DeleteAccountEnvelope {
    fn check(&self) -> Result<(), Failure> {
        match self.commarea.delete_fail_code.trim() {
            "" | "0" => Ok(()),
            "1" => Err(Failure::NotFound(Item::Account)),
            other => Err(Failure::unexpected(other)),
        }
    }

    fn details(&self) -> String {
        let area = &self.commarea;
        Details::new()
            .field("Account Number", unpadded(&area.account_number))
            .field("Sort Code", area.sort_code.trim())
            .field("Customer Number", unpadded(&area.customer_number))
            .field("Account Type", area.account_type.trim())
            .field("Interest Rate", format_money(area.interest_rate))
            .field("Overdraft Limit", area.overdraft_limit)
            .field("Available Balance", format_money(area.available_balance))
            .field("Actual Balance", format_money(area.actual_balance))
            .field("Opened", format_date(area.opened))
            .finish()
    }
}
