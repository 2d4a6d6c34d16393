// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::{Value, json};
use shopdesk_app::forms::RepairTicketFormInput;
use shopdesk_app::query::{ListQuery, TicketFilter, ticket_query};
use shopdesk_app::rows::TicketRow;
use shopdesk_app::{
    PageEnvelope, RepairTicketId, TechnicianId, TicketStatus, normalize_page, unwrap_data,
};
use tracing::warn;

use crate::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technician {
    pub id: Option<TechnicianId>,
    pub name: String,
}

impl Technician {
    fn from_value(value: &Value) -> Self {
        Self {
            id: value.get("id").and_then(Value::as_i64).map(TechnicianId::new),
            name: ["name", "fullName", "username"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

impl Client {
    pub fn list_tickets(&self, query: &ListQuery<TicketFilter>) -> Result<PageEnvelope<TicketRow>> {
        let request = ticket_query(query);
        let body = self
            .get_value(&["api", "repair-tickets"], &request.params)
            .context("list repair tickets")?;
        Ok(normalize_page(&body).map_items(|item| TicketRow::from_value(&item)))
    }

    pub fn get_ticket(&self, id: RepairTicketId) -> Result<TicketRow> {
        let body = self
            .get_value(&["api", "repair-tickets", &id.to_string()], &[])
            .with_context(|| format!("load repair ticket {id}"))?;
        Ok(TicketRow::from_value(unwrap_data(&body)))
    }

    pub fn create_ticket(&self, form: &RepairTicketFormInput) -> Result<TicketRow> {
        form.validate()?;
        let body = self
            .send_value(Method::POST, &["api", "repair-tickets"], Some(&form.payload()))
            .context("create repair ticket")?;
        Ok(TicketRow::from_value(unwrap_data(&body)))
    }

    pub fn update_ticket(&self, id: RepairTicketId, form: &RepairTicketFormInput) -> Result<TicketRow> {
        form.validate()?;
        let body = self
            .send_value(
                Method::PUT,
                &["api", "repair-tickets", &id.to_string()],
                Some(&form.payload()),
            )
            .with_context(|| format!("update repair ticket {id}"))?;
        Ok(TicketRow::from_value(unwrap_data(&body)))
    }

    pub fn delete_ticket(&self, id: RepairTicketId) -> Result<()> {
        self.send_empty(Method::DELETE, &["api", "repair-tickets", &id.to_string()])
            .with_context(|| format!("delete repair ticket {id}"))?;
        Ok(())
    }

    pub fn set_ticket_status(&self, id: RepairTicketId, status: TicketStatus) -> Result<TicketRow> {
        let body = self
            .send_value(
                Method::PATCH,
                &["api", "repair-tickets", &id.to_string(), "status"],
                Some(&json!({ "status": status.as_str() })),
            )
            .with_context(|| format!("set repair ticket {id} to {}", status.as_str()))?;
        let mut row = TicketRow::from_value(unwrap_data(&body));
        if row.status.is_empty() {
            row.status = status.as_str().to_owned();
        }
        Ok(row)
    }

    pub fn mark_ticket_done(&self, id: RepairTicketId) -> Result<TicketRow> {
        self.set_ticket_status(id, TicketStatus::Done)
    }

    /// Empty when the technician list cannot be loaded; ticket forms still
    /// work without it.
    pub fn list_technicians(&self) -> Vec<Technician> {
        let body = match self.get_value(&["api", "technicians"], &[]) {
            Ok(body) => body,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "technician list unavailable");
                return Vec::new();
            }
        };
        normalize_page(&body)
            .items
            .iter()
            .map(Technician::from_value)
            .collect()
    }
}
