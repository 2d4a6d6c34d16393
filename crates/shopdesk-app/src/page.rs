// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Page envelopes as the backend sends them, folded into one shape.
//!
//! The backend answers list calls in three ways: a Spring `Page`
//! (`content`, `number`, `totalPages`, `totalElements`), an ad-hoc
//! `{items, total, page, size}` object, or a bare JSON array. Any of them
//! may arrive inside the `{status, message, data}` wrapper. Normalizing
//! never fails; missing pieces fall back to an empty first page.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    /// 0-based, as the server counts.
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> PageEnvelope<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            total_pages: 1,
            total_items: 0,
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        let total_items = items.len() as u64;
        Self {
            items,
            page: 0,
            total_pages: 1,
            total_items,
        }
    }

    /// 1-based page number for display.
    pub fn ui_page(&self) -> u32 {
        crate::from_server_page(self.page)
    }

    /// Page count for pagers; never below 1.
    pub fn page_count(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// Strips the `{status, message, data}` wrapper when present.
pub fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if !inner.is_null() && value.is_object() => inner,
        _ => value,
    }
}

pub fn normalize_page(value: &Value) -> PageEnvelope<Value> {
    let body = unwrap_data(value);
    match body {
        Value::Array(items) => PageEnvelope::from_items(items.clone()),
        Value::Object(_) => normalize_object(body),
        _ => PageEnvelope::empty(),
    }
}

fn normalize_object(body: &Value) -> PageEnvelope<Value> {
    let items = ["content", "items"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default();

    let page = ["number", "page"]
        .iter()
        .find_map(|key| body.get(*key).and_then(lenient_u64))
        .unwrap_or(0);

    let total = ["totalElements", "total"]
        .iter()
        .find_map(|key| body.get(*key).and_then(lenient_u64));

    let total_pages = match body.get("totalPages").and_then(lenient_u64) {
        Some(pages) => pages,
        None => match (total, body.get("size").and_then(lenient_u64)) {
            (Some(total), Some(size)) if size > 0 => total.div_ceil(size).max(1),
            _ => 1,
        },
    };

    PageEnvelope {
        total_items: total.unwrap_or(items.len() as u64),
        items,
        page: clamp_u32(page),
        total_pages: clamp_u32(total_pages),
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub(crate) fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|v| v as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|v| v != 0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// First key present with a usable value.
pub(crate) fn first_of<'a, T>(
    value: &'a Value,
    keys: &[&str],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(read)
}
