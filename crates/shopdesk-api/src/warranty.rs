// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;
use shopdesk_app::WarrantyLookupResult;
use shopdesk_app::forms::WarrantyLookupInput;

use crate::{ApiError, Client, decode_data};

impl Client {
    /// `Ok(None)` when nothing matches the IMEI or phone.
    pub fn lookup_warranty(&self, input: &WarrantyLookupInput) -> Result<Option<WarrantyLookupResult>> {
        input.validate()?;
        let body = match self.send_value(
            Method::POST,
            &["api", "warranty-lookup"],
            Some(&input.payload()),
        ) {
            Ok(body) => body,
            Err(error)
                if error
                    .downcast_ref::<ApiError>()
                    .and_then(ApiError::status)
                    == Some(404) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(error.context("look up warranty")),
        };
        if body.is_null() || body.get("data").is_some_and(Value::is_null) {
            return Ok(None);
        }
        decode_data(&body, "warranty lookup").map(Some)
    }
}
