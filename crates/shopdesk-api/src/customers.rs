// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reqwest::Method;
use shopdesk_app::forms::CustomerPayload;
use shopdesk_app::query::{CustomerFilter, CustomerRoute, ListQuery, customer_query};
use shopdesk_app::rows::CustomerRow;
use shopdesk_app::{CustomerId, CustomerStatistics, PageEnvelope, normalize_page, unwrap_data};
use std::thread;
use tracing::warn;

use crate::{Client, decode_data, user_message};

/// Per-id result of a bulk action. Failures do not roll back successes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome<Id> {
    pub succeeded: Vec<Id>,
    pub failed: Vec<(Id, String)>,
}

impl<Id> BulkOutcome<Id> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Client {
    /// One page of customers; a keyword switches to the quick-search endpoint.
    /// The tier filter is applied to the returned rows.
    pub fn list_customers(
        &self,
        query: &ListQuery<CustomerFilter>,
    ) -> Result<PageEnvelope<CustomerRow>> {
        let request = customer_query(query);
        let segments: &[&str] = match request.route {
            CustomerRoute::List => &["api", "customers"],
            CustomerRoute::QuickSearch => &["api", "customers", "quick-search"],
        };
        let body = self
            .get_value(segments, &request.params)
            .context("list customers")?;

        let mut envelope = normalize_page(&body).map_items(|item| CustomerRow::from_value(&item));
        envelope
            .items
            .retain(|row| row.matches_tier(query.filter.tier));
        Ok(envelope)
    }

    pub fn get_customer(&self, id: CustomerId) -> Result<CustomerRow> {
        let body = self
            .get_value(&["api", "customers", &id.to_string()], &[])
            .with_context(|| format!("load customer {id}"))?;
        Ok(CustomerRow::from_value(unwrap_data(&body)))
    }

    pub fn create_customer(&self, payload: &CustomerPayload) -> Result<CustomerRow> {
        let body = self
            .send_value(Method::POST, &["api", "customers"], Some(&payload.normalized()))
            .context("create customer")?;
        Ok(CustomerRow::from_value(unwrap_data(&body)))
    }

    pub fn update_customer(&self, id: CustomerId, payload: &CustomerPayload) -> Result<CustomerRow> {
        let body = self
            .send_value(
                Method::PUT,
                &["api", "customers", &id.to_string()],
                Some(&payload.normalized()),
            )
            .with_context(|| format!("update customer {id}"))?;
        Ok(CustomerRow::from_value(unwrap_data(&body)))
    }

    /// Soft delete: the backend keeps the record but marks it inactive.
    pub fn deactivate_customer(&self, id: CustomerId) -> Result<()> {
        self.send_empty(Method::DELETE, &["api", "customers", &id.to_string()])
            .with_context(|| format!("deactivate customer {id}"))?;
        Ok(())
    }

    pub fn activate_customer(&self, id: CustomerId) -> Result<()> {
        self.send_empty(
            Method::PATCH,
            &["api", "customers", &id.to_string(), "activate"],
        )
        .with_context(|| format!("activate customer {id}"))?;
        Ok(())
    }

    pub fn customer_statistics(&self) -> Result<CustomerStatistics> {
        let body = self
            .get_value(&["api", "customers", "statistics"], &[])
            .context("load customer statistics")?;
        decode_data(&body, "customer statistics")
    }

    /// Deactivates every id with one request each, all in flight at once.
    pub fn bulk_deactivate_customers(&self, ids: &[CustomerId]) -> BulkOutcome<CustomerId> {
        let results: Vec<(CustomerId, Result<()>)> = thread::scope(|scope| {
            let handles: Vec<_> = ids
                .iter()
                .map(|id| (*id, scope.spawn(move || self.deactivate_customer(*id))))
                .collect();
            handles
                .into_iter()
                .map(|(id, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(anyhow::anyhow!("deactivate worker panicked")));
                    (id, result)
                })
                .collect()
        });

        let mut outcome = BulkOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(()) => outcome.succeeded.push(id),
                Err(error) => outcome.failed.push((id, user_message(&error))),
            }
        }
        if !outcome.is_complete() {
            warn!(
                failed = outcome.failed.len(),
                succeeded = outcome.succeeded.len(),
                "bulk deactivate partially failed"
            );
        }
        outcome
    }
}
