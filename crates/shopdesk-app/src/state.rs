// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::page::PageEnvelope;
use crate::query::{ListQuery, QueryCommand, QueryEvent};
use crate::rows::{CustomerRow, ProductRow, TicketRow};
use crate::{CustomerId, ProductModelId, RepairTicketId};

/// Rows that can be picked for bulk actions.
pub trait ListRow {
    type Id: Copy + Ord + Debug;

    fn row_id(&self) -> Option<Self::Id>;
}

impl ListRow for CustomerRow {
    type Id = CustomerId;

    fn row_id(&self) -> Option<CustomerId> {
        self.id
    }
}

impl ListRow for ProductRow {
    type Id = ProductModelId;

    fn row_id(&self) -> Option<ProductModelId> {
        self.id
    }
}

impl ListRow for TicketRow {
    type Id = RepairTicketId;

    fn row_id(&self) -> Option<RepairTicketId> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Issued per fetch; only the newest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub struct ListView<F, R: ListRow> {
    query: ListQuery<F>,
    rows: Vec<R>,
    total_pages: u32,
    total_items: u64,
    load: LoadState,
    generation: u64,
    selection: BTreeSet<R::Id>,
}

impl<F: PartialEq, R: ListRow> ListView<F, R> {
    pub fn new(query: ListQuery<F>) -> Self {
        Self {
            query,
            rows: Vec::new(),
            total_pages: 1,
            total_items: 0,
            load: LoadState::Idle,
            generation: 0,
            selection: BTreeSet::new(),
        }
    }

    pub fn query(&self) -> &ListQuery<F> {
        &self.query
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Non-empty events mean the current rows no longer match the query.
    pub fn dispatch(&mut self, command: QueryCommand<F>) -> Vec<QueryEvent> {
        let page_count = self.total_pages();
        self.query.dispatch(command, page_count)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.load = LoadState::Loading;
        FetchTicket(self.generation)
    }

    /// Returns false when a newer fetch was started after `ticket`.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<PageEnvelope<R>, String>,
    ) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        match outcome {
            Ok(envelope) => {
                self.total_pages = envelope.page_count();
                self.total_items = envelope.total_items;
                self.rows = envelope.items;
                self.load = LoadState::Loaded;
                let visible: BTreeSet<R::Id> =
                    self.rows.iter().filter_map(R::row_id).collect();
                self.selection.retain(|id| visible.contains(id));
            }
            Err(message) => {
                self.rows.clear();
                self.total_pages = 1;
                self.total_items = 0;
                self.selection.clear();
                self.load = LoadState::Failed(message);
            }
        }
        true
    }

    /// 1-based `(first, last)` of the visible rows within the total.
    pub fn bounds(&self) -> Option<(u64, u64)> {
        if self.rows.is_empty() {
            return None;
        }
        let offset = u64::from(self.query.page.saturating_sub(1)) * u64::from(self.query.page_size);
        let first = offset + 1;
        let last = (offset + self.rows.len() as u64).min(self.total_items.max(first));
        Some((first, last))
    }

    pub fn toggle_selected(&mut self, id: R::Id) -> bool {
        if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        }
    }

    pub fn select_all_visible(&mut self) {
        self.selection
            .extend(self.rows.iter().filter_map(R::row_id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected(&self) -> Vec<R::Id> {
        self.selection.iter().copied().collect()
    }
}
