// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;

use crate::rows::{CustomerRow, TicketRow};
use crate::{CustomerStatistics, TicketStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub statistics: CustomerStatistics,
    /// Every status in display order, zero counts included.
    pub tickets_by_status: Vec<(TicketStatus, usize)>,
    pub unrecognized_tickets: usize,
    pub open_tickets: usize,
    /// Parts plus labor over finished tickets.
    pub repair_revenue: f64,
    pub page_orders: i64,
    pub page_spend: f64,
    pub top_spender: Option<String>,
}

pub fn summarize(
    statistics: CustomerStatistics,
    tickets: &[TicketRow],
    customers: &[CustomerRow],
) -> DashboardSummary {
    let mut tickets_by_status: Vec<(TicketStatus, usize)> =
        TicketStatus::ALL.iter().map(|status| (*status, 0)).collect();
    let mut unrecognized_tickets = 0;
    let mut repair_revenue = 0.0;

    for ticket in tickets {
        let Some(status) = ticket.status() else {
            unrecognized_tickets += 1;
            continue;
        };
        if let Some(entry) = tickets_by_status.iter_mut().find(|(s, _)| *s == status) {
            entry.1 += 1;
        }
        if matches!(status, TicketStatus::Done | TicketStatus::Delivered) {
            repair_revenue += ticket.total_cost();
        }
    }

    let open_tickets = tickets_by_status
        .iter()
        .filter(|(status, _)| status.is_open())
        .map(|(_, count)| count)
        .sum();

    let top_spender = customers
        .iter()
        .filter(|customer| customer.total_spent > 0.0)
        .max_by(|a, b| a.total_spent.total_cmp(&b.total_spent))
        .map(|customer| customer.name.clone());

    DashboardSummary {
        statistics,
        tickets_by_status,
        unrecognized_tickets,
        open_tickets,
        repair_revenue,
        page_orders: customers
            .iter()
            .map(|customer| customer.total_orders)
            .fold(0, i64::saturating_add),
        page_spend: customers.iter().map(|customer| customer.total_spent).sum(),
        top_spender,
    }
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::rows::{CustomerRow, TicketRow};
    use crate::{CustomerStatistics, TicketStatus};
    use serde_json::json;

    #[test]
    fn groups_tickets_and_totals_page() {
        let tickets = [
            json!({"status": "PENDING"}),
            json!({"status": "IN_PROGRESS"}),
            json!({"status": "DONE", "partsCost": 200000, "laborCost": 50000}),
            json!({"status": "DELIVERED", "laborCost": 100000}),
            json!({"status": "RECEIVED"}),
        ]
        .iter()
        .map(TicketRow::from_value)
        .collect::<Vec<_>>();
        let customers = [
            json!({"fullName": "An", "totalOrders": 2, "totalSpent": 3000000}),
            json!({"fullName": "Binh", "totalOrders": 5, "totalSpent": 9000000}),
        ]
        .iter()
        .map(CustomerRow::from_value)
        .collect::<Vec<_>>();

        let summary = summarize(CustomerStatistics::default(), &tickets, &customers);
        assert_eq!(summary.tickets_by_status.len(), TicketStatus::ALL.len());
        assert_eq!(summary.tickets_by_status[0], (TicketStatus::Pending, 1));
        assert_eq!(summary.open_tickets, 2);
        assert_eq!(summary.unrecognized_tickets, 1);
        assert_eq!(summary.repair_revenue, 350_000.0);
        assert_eq!(summary.page_orders, 7);
        assert_eq!(summary.page_spend, 12_000_000.0);
        assert_eq!(summary.top_spender.as_deref(), Some("Binh"));
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        let summary = summarize(CustomerStatistics::default(), &[], &[]);
        assert_eq!(summary.open_tickets, 0);
        assert_eq!(summary.top_spender, None);
        assert!(summary.tickets_by_status.iter().all(|(_, count)| *count == 0));
    }
}
