use crate::domain::model::{Record, Rejection, DATE_FORMAT};
use crate::domain::ports::Validator;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::net::ToSocketAddrs;
use std::sync::LazyLock;

type Check = std::result::Result<(), Rejection>;

static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("local part pattern is valid")
});

static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("label pattern is valid")
});

/// Top-level domains reserved for documentation, testing and local use.
const SPECIAL_USE_TLDS: [&str; 5] = ["example", "invalid", "local", "localhost", "test"];

/// Email acceptance rules shared by the user and delivery validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailRules {
    /// Also require the domain to resolve in DNS.
    pub check_deliverability: bool,
}

impl EmailRules {
    pub fn with_deliverability() -> Self {
        Self {
            check_deliverability: true,
        }
    }

    pub fn check(&self, field: &str, email: &str) -> Check {
        let reject = |reason: &str| Rejection::InvalidEmail {
            field: field.to_string(),
            email: email.to_string(),
            reason: reason.to_string(),
        };

        let (local, domain) = email
            .split_once('@')
            .ok_or_else(|| reject("there must be an @-sign"))?;

        if domain.contains('@') {
            return Err(reject("there must be exactly one @-sign"));
        }
        if local.is_empty() {
            return Err(reject("there must be something before the @-sign"));
        }
        if domain.is_empty() {
            return Err(reject("there must be something after the @-sign"));
        }
        if local.len() > 64 || !LOCAL_PART.is_match(local) {
            return Err(reject("the part before the @-sign is not valid"));
        }
        if domain.len() > 253 {
            return Err(reject("the domain name is too long"));
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return Err(reject("the domain name must contain a period"));
        }
        if !labels.iter().all(|label| DOMAIN_LABEL.is_match(label)) {
            return Err(reject("the domain name is not valid"));
        }

        let tld = labels.last().map(|l| l.to_ascii_lowercase()).unwrap_or_default();
        if tld.chars().all(|c| c.is_ascii_digit()) {
            return Err(reject("the domain name must end in a letter"));
        }
        if SPECIAL_USE_TLDS.contains(&tld.as_str()) {
            return Err(reject("the domain name is a special-use or reserved name"));
        }

        if self.check_deliverability && !domain_resolves(domain) {
            return Err(reject("the domain name does not exist"));
        }

        Ok(())
    }
}

fn domain_resolves(domain: &str) -> bool {
    match (domain, 25).to_socket_addrs() {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(e) => {
            tracing::debug!("DNS lookup for {} failed: {}", domain, e);
            false
        }
    }
}

pub fn has_required_keys<S: AsRef<str>>(record: &Record, keys: &[S]) -> Check {
    if keys.is_empty() {
        return Err(Rejection::NoRequiredKeys);
    }

    let missing: Vec<String> = keys
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| !record.contains_key(key))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Rejection::MissingKeys(missing))
    }
}

/// Integer value of a JSON number or numeric string.
pub fn parse_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn is_positive(value: &Value) -> bool {
    parse_count(value).is_some_and(|n| n > 0)
}

fn check_count_value(field: &str, value: &Value, allow_zero: bool) -> Check {
    let not_positive = || Rejection::NotPositive {
        field: field.to_string(),
        value: value.to_string(),
    };
    let count = parse_count(value).ok_or_else(not_positive)?;

    if count < 0 || (count == 0 && !allow_zero) {
        return Err(not_positive());
    }
    if count > i64::from(u32::MAX) {
        return Err(Rejection::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_count(record: &Record, field: &str) -> Check {
    match record.get(field) {
        Some(value) => check_count_value(field, value, false),
        None => Ok(()),
    }
}

fn check_string(record: &Record, field: &str) -> Check {
    match record.get(field) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(Rejection::WrongType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn check_number(record: &Record, field: &str) -> Check {
    match record.get(field) {
        None | Some(Value::Number(_)) => Ok(()),
        Some(_) => Err(Rejection::WrongType {
            field: field.to_string(),
            expected: "a number",
        }),
    }
}

fn check_email(record: &Record, field: &str, rules: &EmailRules) -> Check {
    check_string(record, field)?;
    match record.get(field).and_then(Value::as_str) {
        Some(email) => rules.check(field, email),
        None => Ok(()),
    }
}

fn parse_date(record: &Record, field: &str) -> std::result::Result<Option<NaiveDate>, Rejection> {
    let Some(value) = record.get(field) else {
        return Ok(None);
    };
    // only the zero-padded form, so the date is written back unchanged
    value
        .as_str()
        .and_then(|s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .filter(|date| date.format(DATE_FORMAT).to_string() == s)
        })
        .map(Some)
        .ok_or_else(|| Rejection::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct UserValidator {
    pub required_keys: Vec<String>,
    pub email: EmailRules,
}

impl Default for UserValidator {
    fn default() -> Self {
        Self {
            required_keys: keys(&["email", "name", "surname", "city", "latitude", "longitude"]),
            email: EmailRules::default(),
        }
    }
}

impl UserValidator {
    pub fn new(email: EmailRules) -> Self {
        Self {
            email,
            ..Self::default()
        }
    }
}

impl Validator for UserValidator {
    fn check(&self, record: &Record) -> Check {
        has_required_keys(record, &self.required_keys)?;
        for field in ["name", "surname", "city"] {
            check_string(record, field)?;
        }
        for field in ["latitude", "longitude"] {
            check_number(record, field)?;
        }
        check_email(record, "email", &self.email)
    }
}

#[derive(Debug, Clone)]
pub struct LockerValidator {
    pub required_keys: Vec<String>,
    /// Accept compartments declared with capacity 0.
    pub allow_zero_capacity: bool,
}

impl Default for LockerValidator {
    fn default() -> Self {
        Self {
            required_keys: keys(&["locker_id", "city", "latitude", "longitude", "compartments"]),
            allow_zero_capacity: false,
        }
    }
}

impl LockerValidator {
    pub fn new(allow_zero_capacity: bool) -> Self {
        Self {
            allow_zero_capacity,
            ..Self::default()
        }
    }
}

impl Validator for LockerValidator {
    fn check(&self, record: &Record) -> Check {
        has_required_keys(record, &self.required_keys)?;
        for field in ["locker_id", "city"] {
            check_string(record, field)?;
        }
        for field in ["latitude", "longitude"] {
            check_number(record, field)?;
        }

        let Some(compartments) = record.get("compartments") else {
            return Ok(());
        };
        let Value::Object(compartments) = compartments else {
            return Err(Rejection::CompartmentsNotObject);
        };
        for (name, capacity) in compartments {
            let field = format!("compartments.{}", name);
            check_count_value(&field, capacity, self.allow_zero_capacity)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ParcelValidator {
    pub required_keys: Vec<String>,
}

impl Default for ParcelValidator {
    fn default() -> Self {
        Self {
            required_keys: keys(&["parcel_id", "height", "length", "weight"]),
        }
    }
}

impl Validator for ParcelValidator {
    fn check(&self, record: &Record) -> Check {
        has_required_keys(record, &self.required_keys)?;
        check_string(record, "parcel_id")?;
        for field in ["height", "length", "weight"] {
            check_count(record, field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeliverValidator {
    pub required_keys: Vec<String>,
    pub email: EmailRules,
}

impl Default for DeliverValidator {
    fn default() -> Self {
        Self {
            required_keys: keys(&[
                "parcel_id",
                "locker_id",
                "sender_email",
                "receiver_email",
                "sent_date",
                "expected_delivery_date",
            ]),
            email: EmailRules::default(),
        }
    }
}

impl DeliverValidator {
    pub fn new(email: EmailRules) -> Self {
        Self {
            email,
            ..Self::default()
        }
    }
}

impl Validator for DeliverValidator {
    fn check(&self, record: &Record) -> Check {
        has_required_keys(record, &self.required_keys)?;
        for field in ["parcel_id", "locker_id"] {
            check_string(record, field)?;
        }

        check_email(record, "sender_email", &self.email)?;
        check_email(record, "receiver_email", &self.email)?;

        let sender = record.get("sender_email").and_then(Value::as_str);
        let receiver = record.get("receiver_email").and_then(Value::as_str);
        if let (Some(sender), Some(receiver)) = (sender, receiver) {
            if sender == receiver {
                return Err(Rejection::SameSenderAndReceiver(sender.to_string()));
            }
        }

        let sent = parse_date(record, "sent_date")?;
        let expected = parse_date(record, "expected_delivery_date")?;
        if let (Some(sent), Some(expected)) = (sent, expected) {
            if sent >= expected {
                return Err(Rejection::DatesOutOfOrder { sent, expected });
            }
        }

        Ok(())
    }
}
