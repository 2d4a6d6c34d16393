// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::dates::parse_iso_date;
use crate::rows::{CustomerRow, ProductRow, TicketCustomer, TicketDevice, TicketRow};
use crate::{BrandId, CustomerId, CustomerTier, Gender, TechnicianId, TicketStatus};

pub const MIN_IMEI_LEN: usize = 14;

fn trimmed(value: &str) -> String {
    value.trim().to_owned()
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn first_chars(value: &str, count: usize) -> String {
    value.chars().take(count).collect()
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Optional leading `+`, then digits, spaces, `-` and parentheses.
pub fn is_plausible_phone(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    !rest.is_empty()
        && rest
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch.is_whitespace() || matches!(ch, '-' | '(' | ')'))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerFormInput {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    /// `YYYY-MM-DD`, or a timestamp whose date part is used.
    pub birthday: String,
    pub gender: String,
    pub address: String,
    pub note: String,
    pub tier: String,
}

impl CustomerFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            bail!("customer name is required -- enter a name and retry");
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            bail!("customer phone is required -- enter a phone number and retry");
        }
        if !is_plausible_phone(phone) {
            bail!("customer phone {phone:?} is invalid -- use digits, spaces, +, - or parentheses");
        }
        let email = self.email.trim();
        if !email.is_empty() && !is_plausible_email(email) {
            bail!("customer email {email:?} is invalid -- use the form name@example.com");
        }
        let birthday = first_chars(self.birthday.trim(), 10);
        if !birthday.is_empty() && parse_iso_date(&birthday).is_none() {
            bail!("customer birthday {birthday:?} is invalid -- use YYYY-MM-DD");
        }
        if !self.gender.trim().is_empty() && Gender::parse(&self.gender).is_none() {
            bail!("customer gender must be MALE, FEMALE or NA");
        }
        if !self.tier.trim().is_empty() && CustomerTier::parse(&self.tier).is_none() {
            bail!("customer tier must be REGULAR, VIP or POTENTIAL");
        }
        Ok(())
    }

    pub fn payload(&self) -> CustomerPayload {
        CustomerPayload {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            email: Some(self.email.clone()),
            birth_date: Some(self.birthday.clone()),
            gender: Gender::parse(&self.gender).unwrap_or_default(),
            address: Some(self.address.clone()),
            note: Some(self.note.clone()),
            tier: CustomerTier::parse(&self.tier).unwrap_or_default(),
        }
        .normalized()
    }
}

/// Prefills the edit form from a loaded row.
impl From<&CustomerRow> for CustomerFormInput {
    fn from(row: &CustomerRow) -> Self {
        Self {
            full_name: row.name.clone(),
            phone: row.phone.clone(),
            email: row.email.clone(),
            birthday: row.birthday.clone(),
            gender: row.gender.clone(),
            address: row.address.clone(),
            note: row.notes.clone(),
            tier: row.tier.clone(),
        }
    }
}

/// Body for `POST`/`PUT /api/customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPayload {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Gender,
    pub address: Option<String>,
    pub note: Option<String>,
    pub tier: CustomerTier,
}

impl CustomerPayload {
    /// Trims text, turns empty optionals into `None` and cuts the birth
    /// date to `YYYY-MM-DD`. Normalizing twice changes nothing.
    pub fn normalized(&self) -> Self {
        Self {
            full_name: trimmed(&self.full_name),
            phone: trimmed(&self.phone),
            email: optional(self.email.as_deref()),
            birth_date: optional(self.birth_date.as_deref())
                .and_then(|date| optional(Some(first_chars(&date, 10).as_str()))),
            gender: self.gender,
            address: optional(self.address.as_deref()),
            note: optional(self.note.as_deref()),
            tier: self.tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFormInput {
    pub brand_id: BrandId,
    pub name: String,
    pub category: String,
    pub default_warranty_months: i64,
    pub description: String,
    pub is_active: bool,
}

impl Default for ProductFormInput {
    fn default() -> Self {
        Self {
            brand_id: BrandId::new(0),
            name: String::new(),
            category: String::from("PHONE"),
            default_warranty_months: 12,
            description: String::new(),
            is_active: true,
        }
    }
}

impl ProductFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("product name is required -- enter a name and retry");
        }
        if self.brand_id.get() <= 0 {
            bail!("product brand is required -- pass a positive brand id and retry");
        }
        if self.default_warranty_months < 0 {
            bail!("product warranty months cannot be negative");
        }
        Ok(())
    }

    pub fn payload(&self) -> ProductPayload {
        let category = self.category.trim().to_uppercase();
        ProductPayload {
            brand_id: self.brand_id.get(),
            name: trimmed(&self.name),
            category: if category.is_empty() {
                String::from("PHONE")
            } else {
                category
            },
            default_warranty_months: self.default_warranty_months,
            description: self.description.clone(),
        }
    }
}

impl From<&ProductRow> for ProductFormInput {
    fn from(row: &ProductRow) -> Self {
        Self {
            brand_id: row.brand_id.unwrap_or(BrandId::new(0)),
            name: row.name.clone(),
            category: row.category.clone(),
            default_warranty_months: row.default_warranty_months,
            description: row.description.clone(),
            is_active: row.is_active,
        }
    }
}

/// Body for `POST`/`PUT /api/product-models`. Activation has its own
/// endpoints and is not part of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub brand_id: i64,
    pub name: String,
    pub category: String,
    pub default_warranty_months: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepairTicketFormInput {
    pub code: String,
    pub customer: TicketCustomer,
    pub device: TicketDevice,
    pub initial_issue: String,
    pub technician_id: Option<TechnicianId>,
    pub status: TicketStatus,
    pub due_date: String,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub notes: String,
}

impl RepairTicketFormInput {
    pub fn validate(&self) -> Result<()> {
        let has_customer_id = self.customer.id.is_some_and(|id| id.get() > 0);
        if !has_customer_id && self.customer.name.trim().is_empty() {
            bail!("ticket customer is required -- pass a customer id or name and retry");
        }
        if self.initial_issue.trim().is_empty() {
            bail!("ticket issue is required -- describe the fault and retry");
        }
        if self.parts_cost < 0.0 || self.labor_cost < 0.0 {
            bail!("ticket costs cannot be negative");
        }
        let due = self.due_date.trim();
        if !due.is_empty() && parse_iso_date(&first_chars(due, 10)).is_none() {
            bail!("ticket due date {due:?} is invalid -- use YYYY-MM-DD");
        }
        Ok(())
    }

    pub fn payload(&self) -> TicketPayload {
        let due = first_chars(self.due_date.trim(), 10);
        TicketPayload {
            code: trimmed(&self.code),
            customer: TicketCustomer {
                id: self.customer.id.filter(|id| id.get() > 0),
                name: trimmed(&self.customer.name),
                phone: trimmed(&self.customer.phone),
            },
            device: TicketDevice {
                brand: trimmed(&self.device.brand),
                model: trimmed(&self.device.model),
                imei: trimmed(&self.device.imei),
            },
            initial_issue: trimmed(&self.initial_issue),
            technician_id: self.technician_id,
            status: self.status,
            due_date: (!due.is_empty()).then_some(due),
            parts_cost: self.parts_cost,
            labor_cost: self.labor_cost,
            notes: trimmed(&self.notes),
            total_cost: self.parts_cost + self.labor_cost,
        }
    }
}

impl From<&TicketRow> for RepairTicketFormInput {
    fn from(row: &TicketRow) -> Self {
        Self {
            code: row.code.clone(),
            customer: row.customer.clone(),
            device: row.device.clone(),
            initial_issue: row.initial_issue.clone(),
            technician_id: row.technician_id,
            status: row.status().unwrap_or_default(),
            due_date: row.due_date.clone(),
            parts_cost: row.parts_cost,
            labor_cost: row.labor_cost,
            notes: row.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub code: String,
    pub customer: TicketCustomer,
    pub device: TicketDevice,
    pub initial_issue: String,
    pub technician_id: Option<TechnicianId>,
    pub status: TicketStatus,
    pub due_date: Option<String>,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub notes: String,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    fn login_name(&self) -> &str {
        match self.username.trim() {
            "" => self.email.trim(),
            username => username,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let username_len = self.login_name().chars().count();
        if !(3..=100).contains(&username_len) {
            bail!("username must be 3 to 100 characters -- pass --username or --email");
        }
        let password_len = self.password.chars().count();
        if !(6..=100).contains(&password_len) {
            bail!("password must be 6 to 100 characters");
        }
        Ok(())
    }

    pub fn payload(&self) -> LoginPayload {
        LoginPayload {
            username: self.login_name().to_owned(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_terms: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl RegisterInput {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            bail!("full name is required -- enter a name and retry");
        }
        let email = self.email.trim();
        if !is_plausible_email(email) {
            bail!("email {email:?} is invalid -- use the form name@example.com");
        }
        let password_len = self.password.chars().count();
        if !(6..=100).contains(&password_len) {
            bail!("password must be 6 to 100 characters");
        }
        if self.password != self.confirm_password {
            bail!("password confirmation does not match -- retype both passwords");
        }
        if !self.agree_terms {
            bail!("terms of use must be accepted -- pass --agree-terms");
        }
        Ok(())
    }

    pub fn payload(&self) -> RegisterPayload {
        RegisterPayload {
            full_name: trimmed(&self.full_name),
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarrantyLookupInput {
    pub imei: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarrantyLookupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl WarrantyLookupInput {
    pub fn validate(&self) -> Result<()> {
        if self.imei.trim().is_empty() && self.phone.trim().is_empty() {
            bail!("warranty lookup needs an IMEI or a phone number -- pass --imei or --phone");
        }
        Ok(())
    }

    /// Soft warning only; short IMEIs are still sent.
    pub fn imei_hint(&self) -> Option<&'static str> {
        let imei = self.imei.trim();
        (!imei.is_empty() && imei.chars().count() < MIN_IMEI_LEN)
            .then_some("IMEI numbers are usually 14 to 16 characters")
    }

    pub fn payload(&self) -> WarrantyLookupRequest {
        WarrantyLookupRequest {
            imei: optional(Some(&self.imei)),
            phone: optional(Some(&self.phone)),
        }
    }
}

/// Placeholder used when a ticket references a customer by id only.
pub fn customer_ref(id: CustomerId) -> TicketCustomer {
    TicketCustomer {
        id: Some(id),
        ..TicketCustomer::default()
    }
}
