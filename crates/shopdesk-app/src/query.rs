// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::dates::iso_date;
use crate::{BrandId, CustomerTier, SortDirection, TicketStatus};
use time::Date;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 200;

/// UI pages start at 1, the server counts from 0.
pub const fn to_server_page(ui_page: u32) -> u32 {
    ui_page.saturating_sub(1)
}

pub const fn from_server_page(server_page: u32) -> u32 {
    server_page.saturating_add(1)
}

/// Fixed lookup from UI sort keys to server field names.
#[derive(Debug, Clone, Copy)]
pub struct SortFieldMap {
    entries: &'static [(&'static str, &'static str)],
    fallback: &'static str,
}

impl SortFieldMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)], fallback: &'static str) -> Self {
        Self { entries, fallback }
    }

    pub fn server_field(&self, ui_key: &str) -> &'static str {
        self.entries
            .iter()
            .find(|(ui, _)| *ui == ui_key)
            .map(|(_, server)| *server)
            .unwrap_or(self.fallback)
    }
}

pub const CUSTOMER_SORT_FIELDS: SortFieldMap = SortFieldMap::new(
    &[
        ("name", "fullName"),
        ("createdAt", "createdAt"),
        ("totalSpent", "totalSpent"),
        ("totalOrders", "totalOrders"),
    ],
    "fullName",
);

pub const PRODUCT_SORT_FIELDS: SortFieldMap = SortFieldMap::new(
    &[
        ("name", "name"),
        ("category", "category"),
        ("defaultWarrantyMonths", "defaultWarrantyMonths"),
        ("createdAt", "createdAt"),
    ],
    "name",
);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerFilter {
    /// Applied to the fetched rows; the list endpoints have no tier filter.
    pub tier: Option<CustomerTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductFilter {
    pub active: Option<bool>,
    pub brand_id: Option<BrandId>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub keyword: String,
    pub filter: F,
    pub sort_key: String,
    pub direction: SortDirection,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl<F: Default> ListQuery<F> {
    pub fn new(sort_key: &str, page_size: u32) -> Self {
        Self {
            keyword: String::new(),
            filter: F::default(),
            sort_key: sort_key.to_owned(),
            direction: SortDirection::Asc,
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryCommand<F> {
    Search(String),
    Filter(F),
    /// Same key flips direction, a new key starts ascending.
    SortBy(String),
    SetDirection(SortDirection),
    GoToPage(u32),
    NextPage,
    PrevPage,
    PageSize(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    KeywordChanged(String),
    FilterChanged,
    SortChanged {
        key: String,
        direction: SortDirection,
    },
    PageChanged(u32),
    PageSizeChanged(u32),
}

impl<F: PartialEq> ListQuery<F> {
    pub fn server_page(&self) -> u32 {
        to_server_page(self.page)
    }

    pub fn search_keyword(&self) -> Option<&str> {
        let trimmed = self.keyword.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Applies one change. An empty result means nothing needs refetching.
    pub fn dispatch(&mut self, command: QueryCommand<F>, page_count: u32) -> Vec<QueryEvent> {
        let page_count = page_count.max(1);
        match command {
            QueryCommand::Search(keyword) => {
                if keyword == self.keyword {
                    return Vec::new();
                }
                self.keyword = keyword;
                let mut events = vec![QueryEvent::KeywordChanged(self.keyword.clone())];
                events.extend(self.reset_page());
                events
            }
            QueryCommand::Filter(filter) => {
                if filter == self.filter {
                    return Vec::new();
                }
                self.filter = filter;
                let mut events = vec![QueryEvent::FilterChanged];
                events.extend(self.reset_page());
                events
            }
            QueryCommand::SortBy(key) => {
                if key == self.sort_key {
                    self.direction = self.direction.flipped();
                } else {
                    self.sort_key = key;
                    self.direction = SortDirection::Asc;
                }
                vec![self.sort_event()]
            }
            QueryCommand::SetDirection(direction) => {
                if direction == self.direction {
                    return Vec::new();
                }
                self.direction = direction;
                vec![self.sort_event()]
            }
            QueryCommand::GoToPage(page) => self.move_to(page.clamp(1, page_count)),
            QueryCommand::NextPage => self.move_to((self.page + 1).min(page_count)),
            QueryCommand::PrevPage => self.move_to(self.page.saturating_sub(1).max(1)),
            QueryCommand::PageSize(size) => {
                let size = size.clamp(1, MAX_PAGE_SIZE);
                if size == self.page_size {
                    return Vec::new();
                }
                self.page_size = size;
                let mut events = vec![QueryEvent::PageSizeChanged(size)];
                events.extend(self.reset_page());
                events
            }
        }
    }

    fn move_to(&mut self, page: u32) -> Vec<QueryEvent> {
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        vec![QueryEvent::PageChanged(page)]
    }

    fn reset_page(&mut self) -> Option<QueryEvent> {
        (self.page != 1).then(|| {
            self.page = 1;
            QueryEvent::PageChanged(1)
        })
    }

    fn sort_event(&self) -> QueryEvent {
        QueryEvent::SortChanged {
            key: self.sort_key.clone(),
            direction: self.direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerQuery<R> {
    pub route: R,
    pub params: Vec<(&'static str, String)>,
}

impl<R> ServerQuery<R> {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRoute {
    List,
    QuickSearch,
}

pub fn customer_query(query: &ListQuery<CustomerFilter>) -> ServerQuery<CustomerRoute> {
    let sort = format!(
        "{},{}",
        CUSTOMER_SORT_FIELDS.server_field(&query.sort_key),
        query.direction.as_str()
    );
    let mut params = vec![
        ("page", query.server_page().to_string()),
        ("size", query.page_size.to_string()),
        ("sort", sort),
    ];
    let route = match query.search_keyword() {
        Some(keyword) => {
            params.insert(0, ("keyword", keyword.to_owned()));
            CustomerRoute::QuickSearch
        }
        None => CustomerRoute::List,
    };
    ServerQuery { route, params }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRoute {
    Active,
    Inactive,
    Brand(BrandId),
    Category(String),
    Paged,
}

impl ProductRoute {
    /// Filtered routes return bare arrays without server paging.
    pub const fn is_paged(&self) -> bool {
        matches!(self, Self::Paged)
    }
}

pub fn product_query(query: &ListQuery<ProductFilter>) -> ServerQuery<ProductRoute> {
    let filter = &query.filter;
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty() && !category.eq_ignore_ascii_case("ALL"));

    let route = match (filter.active, filter.brand_id, category) {
        (Some(true), _, _) => ProductRoute::Active,
        (Some(false), _, _) => ProductRoute::Inactive,
        (None, Some(brand_id), _) => ProductRoute::Brand(brand_id),
        (None, None, Some(category)) => ProductRoute::Category(category.to_owned()),
        (None, None, None) => ProductRoute::Paged,
    };

    let params = if route.is_paged() {
        vec![
            ("page", query.server_page().to_string()),
            ("size", query.page_size.to_string()),
            ("sortBy", PRODUCT_SORT_FIELDS.server_field(&query.sort_key).to_owned()),
            ("sortDir", query.direction.as_str().to_owned()),
        ]
    } else {
        Vec::new()
    };
    ServerQuery { route, params }
}

pub fn ticket_query(query: &ListQuery<TicketFilter>) -> ServerQuery<()> {
    let mut params = Vec::new();
    if let Some(keyword) = query.search_keyword() {
        params.push(("q", keyword.to_owned()));
    }
    if let Some(status) = query.filter.status {
        params.push(("status", status.as_str().to_owned()));
    }
    if let Some(from) = query.filter.from {
        params.push(("from", iso_date(from)));
    }
    if let Some(to) = query.filter.to {
        params.push(("to", iso_date(to)));
    }
    params.push(("page", query.server_page().to_string()));
    params.push(("size", query.page_size.to_string()));
    ServerQuery { route: (), params }
}
