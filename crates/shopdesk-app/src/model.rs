// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerTier {
    #[default]
    Regular,
    Vip,
    Potential,
}

impl CustomerTier {
    pub const ALL: [Self; 3] = [Self::Regular, Self::Vip, Self::Potential];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Vip => "VIP",
            Self::Potential => "POTENTIAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "REGULAR" => Some(Self::Regular),
            "VIP" => Some(Self::Vip),
            "POTENTIAL" => Some(Self::Potential),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Vip => "vip",
            Self::Potential => "potential",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Na,
}

impl Gender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Na => "NA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "NA" => Some(Self::Na),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Pending,
    InProgress,
    WaitParts,
    Done,
    Delivered,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::InProgress,
        Self::WaitParts,
        Self::Done,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::WaitParts => "WAIT_PARTS",
            Self::Done => "DONE",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" => Some(Self::InProgress),
            "WAIT_PARTS" => Some(Self::WaitParts),
            "DONE" => Some(Self::Done),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::WaitParts => "waiting for parts",
            Self::Done => "done",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Tickets still on the bench.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::WaitParts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Customers,
    ProductModels,
    RepairTickets,
}

impl EntityKind {
    /// Stem used for export file names.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::ProductModels => "product-models",
            Self::RepairTickets => "repair-tickets",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::ProductModels => "product models",
            Self::RepairTickets => "repair tickets",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerStatistics {
    pub total_active_customers: Option<i64>,
    pub regular_tier_count: Option<i64>,
    pub vip_tier_count: Option<i64>,
    pub potential_tier_count: Option<i64>,
    pub new_customers_this_month: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyLookupResult {
    pub customer: WarrantyCustomer,
    pub device: WarrantyDevice,
    pub order: WarrantyOrder,
    pub warranty: WarrantyCoverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyCustomer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyDevice {
    pub product_name: String,
    pub imei: String,
    pub color: String,
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyOrder {
    pub code: String,
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyCoverage {
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub history: Vec<WarrantyEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyEvent {
    pub at: String,
    pub title: String,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::{CustomerStatistics, CustomerTier, SortDirection, TicketStatus};
    use anyhow::Result;

    #[test]
    fn tier_parse_is_case_insensitive() {
        assert_eq!(CustomerTier::parse("vip"), Some(CustomerTier::Vip));
        assert_eq!(CustomerTier::parse(" Regular "), Some(CustomerTier::Regular));
        assert_eq!(CustomerTier::parse("gold"), None);
    }

    #[test]
    fn ticket_status_round_trips_through_wire_name() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert!(TicketStatus::WaitParts.is_open());
        assert!(!TicketStatus::Delivered.is_open());
    }

    #[test]
    fn sort_direction_flips() {
        assert_eq!(SortDirection::Asc.flipped(), SortDirection::Desc);
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
    }

    #[test]
    fn statistics_tolerate_missing_fields() -> Result<()> {
        let stats: CustomerStatistics = serde_json::from_str(r#"{"vipTierCount": 4}"#)?;
        assert_eq!(stats.vip_tier_count, Some(4));
        assert_eq!(stats.total_active_customers, None);
        Ok(())
    }
}
