// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reqwest::Method;
use shopdesk_app::forms::ProductFormInput;
use shopdesk_app::query::{ListQuery, ProductFilter, ProductRoute, product_query};
use shopdesk_app::rows::{ProductRow, filter_products};
use shopdesk_app::{PageEnvelope, ProductModelId, normalize_page, unwrap_data};
use tracing::{info, warn};

use crate::{BulkOutcome, Client, is_foreign_key_violation, user_message};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSave {
    pub product: ProductRow,
    /// New activation state when it had to be flipped after saving.
    pub activation_changed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductDeletion {
    Deleted { deactivated_first: bool },
    /// SKUs still point at the model; it stays, deactivated.
    StillReferenced { deactivated_first: bool },
}

impl Client {
    /// Filtered routes return every match as one page. The keyword is
    /// matched locally over the rows that came back.
    pub fn list_products(&self, query: &ListQuery<ProductFilter>) -> Result<PageEnvelope<ProductRow>> {
        let request = product_query(query);
        let brand;
        let mut segments = vec!["api", "product-models"];
        match &request.route {
            ProductRoute::Active => segments.push("active"),
            ProductRoute::Inactive => segments.push("inactive"),
            ProductRoute::Brand(id) => {
                brand = id.to_string();
                segments.extend(["brand", brand.as_str()]);
            }
            ProductRoute::Category(category) => segments.extend(["category", category.as_str()]),
            ProductRoute::Paged => {}
        }
        let body = self
            .get_value(&segments, &request.params)
            .context("list product models")?;

        let mut envelope = normalize_page(&body).map_items(|item| ProductRow::from_value(&item));
        if let Some(keyword) = query.search_keyword() {
            envelope.items = filter_products(envelope.items, keyword);
            if !request.route.is_paged() {
                envelope.total_items = envelope.items.len() as u64;
            }
        }
        Ok(envelope)
    }

    pub fn get_product(&self, id: ProductModelId) -> Result<ProductRow> {
        let body = self
            .get_value(&["api", "product-models", &id.to_string()], &[])
            .with_context(|| format!("load product model {id}"))?;
        Ok(ProductRow::from_value(unwrap_data(&body)))
    }

    /// Creates the model; an inactive form is created then deactivated.
    pub fn create_product(&self, form: &ProductFormInput) -> Result<ProductSave> {
        form.validate()?;
        let body = self
            .send_value(Method::POST, &["api", "product-models"], Some(&form.payload()))
            .context("create product model")?;
        let mut product = ProductRow::from_value(unwrap_data(&body));

        let mut activation_changed = None;
        if !form.is_active
            && let Some(id) = product.id
        {
            self.deactivate_product(id)?;
            product.is_active = false;
            activation_changed = Some(false);
        }
        Ok(ProductSave {
            product,
            activation_changed,
        })
    }

    /// Updates the fields, then flips activation through its own endpoint
    /// when the form disagrees with `was_active`.
    pub fn update_product(
        &self,
        id: ProductModelId,
        form: &ProductFormInput,
        was_active: bool,
    ) -> Result<ProductSave> {
        form.validate()?;
        let body = self
            .send_value(
                Method::PUT,
                &["api", "product-models", &id.to_string()],
                Some(&form.payload()),
            )
            .with_context(|| format!("update product model {id}"))?;
        let mut product = ProductRow::from_value(unwrap_data(&body));
        if product.id.is_none() {
            product.id = Some(id);
        }

        let mut activation_changed = None;
        if form.is_active != was_active {
            if form.is_active {
                self.activate_product(id)?;
            } else {
                self.deactivate_product(id)?;
            }
            product.is_active = form.is_active;
            activation_changed = Some(form.is_active);
        }
        Ok(ProductSave {
            product,
            activation_changed,
        })
    }

    pub fn activate_product(&self, id: ProductModelId) -> Result<()> {
        self.send_empty(
            Method::PUT,
            &["api", "product-models", &id.to_string(), "activate"],
        )
        .with_context(|| format!("activate product model {id}"))?;
        Ok(())
    }

    pub fn deactivate_product(&self, id: ProductModelId) -> Result<()> {
        self.send_empty(
            Method::PUT,
            &["api", "product-models", &id.to_string(), "deactivate"],
        )
        .with_context(|| format!("deactivate product model {id}"))?;
        Ok(())
    }

    /// Hard delete. Active models are deactivated first; a foreign-key
    /// refusal is reported as [`ProductDeletion::StillReferenced`].
    pub fn delete_product(&self, id: ProductModelId, is_active: bool) -> Result<ProductDeletion> {
        if is_active {
            self.deactivate_product(id)?;
        }
        match self.send_empty(Method::DELETE, &["api", "product-models", &id.to_string()]) {
            Ok(_) => {
                info!(%id, "product model deleted");
                Ok(ProductDeletion::Deleted {
                    deactivated_first: is_active,
                })
            }
            Err(error) if is_foreign_key_violation(&error) => {
                warn!(%id, "product model still referenced by SKUs");
                Ok(ProductDeletion::StillReferenced {
                    deactivated_first: is_active,
                })
            }
            Err(error) => Err(error.context(format!("delete product model {id}"))),
        }
    }

    /// Creates imported rows in file order; keys in the outcome are the
    /// caller's row numbers.
    pub fn import_products(&self, rows: &[(usize, ProductFormInput)]) -> BulkOutcome<usize> {
        let mut outcome = BulkOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (line, form) in rows {
            match self.create_product(form) {
                Ok(_) => outcome.succeeded.push(*line),
                Err(error) => outcome.failed.push((*line, user_message(&error))),
            }
        }
        if !outcome.is_complete() {
            warn!(failed = outcome.failed.len(), "product import partially failed");
        }
        outcome
    }
}
