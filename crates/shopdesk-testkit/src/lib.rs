// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use shopdesk_app::{CustomerTier, TicketStatus};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

const FAMILY_NAMES: [&str; 10] = [
    "Nguyen", "Tran", "Le", "Pham", "Hoang", "Huynh", "Phan", "Vu", "Dang", "Bui",
];
const MIDDLE_NAMES: [&str; 6] = ["Van", "Thi", "Minh", "Ngoc", "Duc", "Thu"];
const GIVEN_NAMES: [&str; 12] = [
    "An", "Binh", "Chi", "Dung", "Giang", "Hai", "Khanh", "Lan", "Minh", "Nam", "Phuong", "Vy",
];
const STREETS: [&str; 8] = [
    "Le Loi",
    "Nguyen Hue",
    "Hai Ba Trung",
    "Tran Hung Dao",
    "Dien Bien Phu",
    "Cach Mang Thang Tam",
    "Vo Van Tan",
    "Pasteur",
];
const BRANDS: [(i64, &str); 5] = [
    (1, "Apple"),
    (2, "Samsung"),
    (3, "Xiaomi"),
    (4, "OPPO"),
    (5, "Anker"),
];
const PHONE_MODELS: [&str; 8] = [
    "iPhone 15", "iPhone 14", "Galaxy S24", "Galaxy A55", "Redmi Note 13", "Xiaomi 14", "Reno 11",
    "Find X7",
];
const ISSUES: [&str; 6] = [
    "cracked screen",
    "battery drains fast",
    "no power",
    "charging port loose",
    "camera blurry",
    "water damage",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for backend-shaped JSON records.
#[derive(Debug, Clone)]
pub struct ShopFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl ShopFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    fn id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        min + self.rng.int_n((max - min + 1) as usize) as i64
    }

    pub fn full_name(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(&FAMILY_NAMES),
            self.pick(&MIDDLE_NAMES),
            self.pick(&GIVEN_NAMES)
        )
    }

    pub fn phone(&mut self) -> String {
        format!(
            "09{:02} {:03} {:03}",
            self.int_range(0, 99),
            self.int_range(0, 999),
            self.int_range(0, 999)
        )
    }

    /// A customer as `GET /api/customers` returns it.
    pub fn customer(&mut self) -> Value {
        let id = self.id();
        let name = self.full_name();
        let tier = CustomerTier::ALL[self.rng.int_n(CustomerTier::ALL.len())];
        let orders = self.int_range(0, 12);
        json!({
            "id": id,
            "fullName": name,
            "phone": self.phone(),
            "email": format!("customer{id}@shop.example"),
            "fullAddress": format!("{} {}, District 1, HCMC", self.int_range(1, 300), self.pick(&STREETS)),
            "gender": if self.rng.bool() { "MALE" } else { "FEMALE" },
            "tier": tier.as_str(),
            "totalOrders": orders,
            "totalSpent": orders * self.int_range(200, 30_000) * 1_000,
            "createdAt": fixture_datetime(),
            "lastOrderDate": if orders > 0 { Value::from(fixture_datetime()) } else { Value::Null },
        })
    }

    pub fn product(&mut self) -> Value {
        let id = self.id();
        let (brand_id, brand_name) = BRANDS[self.rng.int_n(BRANDS.len())];
        let name = if brand_name == "Anker" {
            String::from("PowerCore 10000")
        } else {
            self.pick(&PHONE_MODELS).to_owned()
        };
        json!({
            "id": id,
            "brandId": brand_id,
            "brandName": brand_name,
            "name": name,
            "category": if brand_name == "Anker" { "ACCESSORY" } else { "PHONE" },
            "defaultWarrantyMonths": if brand_name == "Anker" { 6 } else { 12 },
            "description": "",
            "isActive": self.rng.bool(),
            "createdAt": fixture_datetime(),
        })
    }

    pub fn ticket(&mut self) -> Value {
        let id = self.id();
        let status = TicketStatus::ALL[self.rng.int_n(TicketStatus::ALL.len())];
        let (_, brand) = BRANDS[self.rng.int_n(BRANDS.len() - 1)];
        json!({
            "id": id,
            "code": format!("RT2025-{id:03}"),
            "customer": {"id": self.int_range(1, 50), "name": self.full_name(), "phone": self.phone()},
            "device": {
                "brand": brand,
                "model": self.pick(&PHONE_MODELS),
                "imei": format!("35{:013}", self.int_range(0, 9_999_999_999_999)),
            },
            "initialIssue": self.pick(&ISSUES),
            "status": status.as_str(),
            "createdAt": fixture_datetime(),
            "partsCost": self.int_range(0, 40) * 50_000,
            "laborCost": self.int_range(1, 6) * 50_000,
        })
    }

    pub fn customers(&mut self, count: usize) -> Vec<Value> {
        (0..count).map(|_| self.customer()).collect()
    }

    pub fn products(&mut self, count: usize) -> Vec<Value> {
        (0..count).map(|_| self.product()).collect()
    }

    pub fn tickets(&mut self, count: usize) -> Vec<Value> {
        (0..count).map(|_| self.ticket()).collect()
    }
}

/// Spring `Page` body.
pub fn spring_page(content: Vec<Value>, number: u32, size: u32, total_elements: u64) -> Value {
    let total_pages = if size == 0 {
        1
    } else {
        total_elements.div_ceil(u64::from(size))
    };
    json!({
        "content": content,
        "number": number,
        "size": size,
        "totalPages": total_pages,
        "totalElements": total_elements,
    })
}

/// The backend's `{status, message, data}` wrapper.
pub fn wrapped(data: Value) -> Value {
    json!({"status": 200, "message": "success", "data": data})
}

pub fn error_body(status: u16, message: &str) -> Value {
    json!({"status": status, "message": message, "data": null})
}

pub fn fixture_datetime() -> &'static str {
    "2025-06-01T09:30:00"
}

pub fn temp_dir_path(file_name: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join(file_name);
    Ok((dir, path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, as sent.
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.url.split_once('?').map_or(&self.url, |(path, _)| path)
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some((_, query)) = self.url.split_once('?') else {
            return Vec::new();
        };
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn json_body(&self) -> Result<Value> {
        serde_json::from_str(&self.body).context("decode recorded request body")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    /// Content-Length to announce when it differs from the body.
    pub declared_length: Option<usize>,
}

impl MockResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
            declared_length: None,
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            content_type: "text/plain",
            declared_length: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    /// Announces more bytes than it sends, so the client sees the body end early.
    pub fn cut_short(status: u16, body: &str) -> Self {
        Self {
            declared_length: Some(body.len() + 64),
            ..Self::text(status, body)
        }
    }
}

/// Loopback HTTP server that answers a fixed number of requests and
/// records each one.
pub struct MockServer {
    base_url: String,
    handle: JoinHandle<Result<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Replies in order, one response per request.
    pub fn start(responses: Vec<MockResponse>) -> Result<Self> {
        let count = responses.len();
        let mut queue = responses.into_iter();
        Self::start_with(count, move |_| {
            queue
                .next()
                .unwrap_or_else(|| MockResponse::text(500, "mock server ran out of responses"))
        })
    }

    /// Replies through `respond`, for requests that may arrive in any order.
    pub fn start_with<F>(count: usize, mut respond: F) -> Result<Self>
    where
        F: FnMut(&RecordedRequest) -> MockResponse + Send + 'static,
    {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::with_capacity(count);
            for _ in 0..count {
                let Some(mut request) = server
                    .recv_timeout(Duration::from_secs(5))
                    .context("receive mock request")?
                else {
                    break;
                };

                let mut body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut body)
                    .context("read mock request body")?;
                let entry = RecordedRequest {
                    method: request.method().as_str().to_owned(),
                    url: request.url().to_owned(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv("Authorization"))
                        .map(|header| header.value.as_str().to_owned()),
                    body,
                };

                let reply = respond(&entry);
                let content_type = Header::from_bytes("Content-Type", reply.content_type)
                    .map_err(|()| anyhow!("invalid content type header"))?;
                let length = reply.declared_length.unwrap_or(reply.body.len());
                let response = Response::new(
                    StatusCode(reply.status),
                    vec![content_type],
                    Cursor::new(reply.body.into_bytes()),
                    Some(length),
                    None,
                );
                request.respond(response).context("send mock response")?;
                recorded.push(entry);
            }
            Ok(recorded)
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the scripted requests and returns what was received.
    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))?
    }
}
