// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Server JSON projected into one row shape per entity.
//!
//! The backend is not consistent about field names (`fullName` vs `name`,
//! `fullAddress` vs `address`, ...). Rows pick the first alias present and
//! fall back to empty strings and zeros, so mapping never fails.

use serde::Serialize;
use serde_json::Value;

use crate::page::{first_of, lenient_bool, lenient_f64, lenient_i64, lenient_string};
use crate::{
    BrandId, CustomerId, CustomerTier, ProductModelId, RepairTicketId, TechnicianId, TicketStatus,
};

fn text(value: &Value, keys: &[&str]) -> String {
    first_of(value, keys, lenient_string).unwrap_or_default()
}

fn int(value: &Value, keys: &[&str]) -> Option<i64> {
    first_of(value, keys, lenient_i64)
}

fn amount(value: &Value, keys: &[&str]) -> f64 {
    first_of(value, keys, lenient_f64).unwrap_or(0.0)
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub birthday: String,
    pub gender: String,
    /// Uppercased; unknown tiers are kept verbatim.
    pub tier: String,
    pub total_orders: i64,
    pub total_spent: f64,
    pub created_at: String,
    pub last_purchase: String,
    pub notes: String,
}

impl CustomerRow {
    pub fn from_value(value: &Value) -> Self {
        let tier = text(value, &["tier"]).trim().to_uppercase();
        Self {
            id: int(value, &["id"]).map(CustomerId::new),
            name: text(value, &["fullName", "name"]),
            email: text(value, &["email"]),
            phone: text(value, &["phone"]),
            address: text(value, &["fullAddress", "address"]),
            company: text(value, &["company"]),
            birthday: text(value, &["birthDate", "birthday"]),
            gender: text(value, &["gender"]).trim().to_uppercase(),
            tier: if tier.is_empty() {
                CustomerTier::default().as_str().to_owned()
            } else {
                tier
            },
            total_orders: int(value, &["totalOrders"]).unwrap_or(0),
            total_spent: amount(value, &["totalSpent"]),
            created_at: text(value, &["createdAt"]),
            last_purchase: text(value, &["lastOrderDate", "lastPurchase"]),
            notes: text(value, &["note", "notes"]),
        }
    }

    pub fn tier(&self) -> Option<CustomerTier> {
        CustomerTier::parse(&self.tier)
    }

    pub fn matches_tier(&self, tier: Option<CustomerTier>) -> bool {
        tier.is_none_or(|tier| self.tier == tier.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: Option<ProductModelId>,
    pub brand_id: Option<BrandId>,
    pub brand_name: String,
    pub name: String,
    pub category: String,
    pub default_warranty_months: i64,
    pub description: String,
    pub is_active: bool,
}

impl ProductRow {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: int(value, &["id"]).map(ProductModelId::new),
            brand_id: int(value, &["brandId"]).map(BrandId::new),
            brand_name: text(value, &["brandName"]),
            name: text(value, &["name"]),
            category: text(value, &["category"]).trim().to_uppercase(),
            default_warranty_months: int(value, &["defaultWarrantyMonths"]).unwrap_or(0),
            description: text(value, &["description"]),
            is_active: first_of(value, &["isActive", "active"], lenient_bool).unwrap_or(false),
        }
    }

    /// Case-insensitive match over name, category, brand name and brand id.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        contains_folded(&self.name, &needle)
            || contains_folded(&self.category, &needle)
            || contains_folded(&self.brand_name, &needle)
            || self
                .brand_id
                .is_some_and(|id| id.to_string().contains(&needle))
    }
}

pub fn filter_products(rows: Vec<ProductRow>, keyword: &str) -> Vec<ProductRow> {
    rows.into_iter()
        .filter(|row| row.matches_keyword(keyword))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TicketCustomer {
    pub id: Option<CustomerId>,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TicketDevice {
    pub brand: String,
    pub model: String,
    pub imei: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRow {
    pub id: Option<RepairTicketId>,
    pub code: String,
    pub customer: TicketCustomer,
    pub device: TicketDevice,
    pub initial_issue: String,
    pub technician_id: Option<TechnicianId>,
    pub technician_name: String,
    /// Raw wire value; see [`TicketRow::status`].
    pub status: String,
    pub created_at: String,
    pub due_date: String,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub notes: String,
}

impl TicketRow {
    pub fn from_value(value: &Value) -> Self {
        let nested_customer = value.get("customer").filter(|inner| inner.is_object());
        let customer = match nested_customer {
            Some(inner) => TicketCustomer {
                id: int(inner, &["id"]).map(CustomerId::new),
                name: text(inner, &["name", "fullName"]),
                phone: text(inner, &["phone"]),
            },
            None => TicketCustomer {
                id: int(value, &["customerId"]).map(CustomerId::new),
                name: text(value, &["customerName"]),
                phone: text(value, &["customerPhone"]),
            },
        };

        let device = match value.get("device").filter(|inner| inner.is_object()) {
            Some(inner) => TicketDevice {
                brand: text(inner, &["brand"]),
                model: text(inner, &["model"]),
                imei: text(inner, &["imei"]),
            },
            None => TicketDevice {
                brand: String::new(),
                model: text(value, &["deviceInfo"]),
                imei: text(value, &["serialNumber", "imei"]),
            },
        };

        Self {
            id: int(value, &["id"]).map(RepairTicketId::new),
            code: text(value, &["code", "ticketNumber"]),
            customer,
            device,
            initial_issue: text(value, &["initialIssue", "issueDescription", "issueDesc"]),
            technician_id: int(value, &["technicianId", "assignedTechnicianId"])
                .map(TechnicianId::new),
            technician_name: text(value, &["technicianName", "assignedTechnicianName"]),
            status: text(value, &["status"]).trim().to_uppercase(),
            created_at: text(value, &["createdAt", "receivedDate"]),
            due_date: text(value, &["dueDate"]),
            parts_cost: amount(value, &["partsCost"]),
            labor_cost: amount(value, &["laborCost"]),
            notes: text(value, &["notes", "note", "completionNotes"]),
        }
    }

    pub fn status(&self) -> Option<TicketStatus> {
        TicketStatus::parse(&self.status)
    }

    pub fn total_cost(&self) -> f64 {
        self.parts_cost + self.labor_cost
    }

    /// Code when the server assigned one, else `#id`.
    pub fn display_code(&self) -> String {
        match (self.code.trim(), self.id) {
            ("", Some(id)) => format!("#{id}"),
            ("", None) => String::from("-"),
            (code, _) => code.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerRow, ProductRow, TicketRow, filter_products};
    use crate::{BrandId, CustomerTier, TicketStatus};
    use serde_json::json;

    #[test]
    fn customer_row_prefers_server_aliases() {
        let row = CustomerRow::from_value(&json!({
            "id": 12,
            "fullName": "Tran Thi Vy",
            "name": "ignored",
            "fullAddress": "12 Le Loi, Q1",
            "address": "ignored",
            "tier": "vip",
            "totalOrders": 3,
            "totalSpent": 15990000.0,
            "lastOrderDate": "2025-04-02T09:10:00",
            "note": "prefers Zalo"
        }));
        assert_eq!(row.name, "Tran Thi Vy");
        assert_eq!(row.address, "12 Le Loi, Q1");
        assert_eq!(row.tier, "VIP");
        assert_eq!(row.tier(), Some(CustomerTier::Vip));
        assert_eq!(row.total_orders, 3);
        assert_eq!(row.last_purchase, "2025-04-02T09:10:00");
        assert_eq!(row.notes, "prefers Zalo");
    }

    #[test]
    fn customer_row_fills_gaps() {
        let row = CustomerRow::from_value(&json!({"name": "Walk-in", "tier": "gold"}));
        assert_eq!(row.id, None);
        assert_eq!(row.name, "Walk-in");
        assert_eq!(row.email, "");
        assert_eq!(row.total_spent, 0.0);
        assert_eq!(row.tier, "GOLD");
        assert_eq!(row.tier(), None);

        let bare = CustomerRow::from_value(&json!({}));
        assert_eq!(bare.tier, "REGULAR");
    }

    #[test]
    fn customer_tier_filter() {
        let row = CustomerRow::from_value(&json!({"tier": "Potential"}));
        assert!(row.matches_tier(None));
        assert!(row.matches_tier(Some(CustomerTier::Potential)));
        assert!(!row.matches_tier(Some(CustomerTier::Vip)));
    }

    #[test]
    fn product_row_reads_active_flag_aliases() {
        let row = ProductRow::from_value(&json!({
            "id": 5,
            "brandId": 2,
            "brandName": "Apple",
            "name": "iPhone 15",
            "category": "phone",
            "defaultWarrantyMonths": 12,
            "active": true
        }));
        assert_eq!(row.category, "PHONE");
        assert!(row.is_active);
        assert_eq!(row.brand_id, Some(BrandId::new(2)));

        let inactive = ProductRow::from_value(&json!({"isActive": false, "active": true}));
        assert!(!inactive.is_active);
    }

    #[test]
    fn product_keyword_filter_covers_brand() {
        let rows = vec![
            ProductRow::from_value(&json!({"name": "Galaxy S24", "brandName": "Samsung", "brandId": 3})),
            ProductRow::from_value(&json!({"name": "Case", "category": "accessory", "brandId": 9})),
        ];
        assert_eq!(filter_products(rows.clone(), "samsung").len(), 1);
        assert_eq!(filter_products(rows.clone(), "ACCESS").len(), 1);
        assert_eq!(filter_products(rows.clone(), "9").len(), 1);
        assert_eq!(filter_products(rows, "  ").len(), 2);
    }

    #[test]
    fn ticket_row_reads_nested_and_flat_shapes() {
        let nested = TicketRow::from_value(&json!({
            "id": 4,
            "code": "RT2025-004",
            "customer": {"id": 8, "name": "Minh", "phone": "0901"},
            "device": {"brand": "Apple", "model": "iPhone 12", "imei": "356789012345678"},
            "initialIssue": "cracked screen",
            "status": "wait_parts",
            "partsCost": 1200000,
            "laborCost": "300000"
        }));
        assert_eq!(nested.customer.name, "Minh");
        assert_eq!(nested.device.model, "iPhone 12");
        assert_eq!(nested.status(), Some(TicketStatus::WaitParts));
        assert_eq!(nested.total_cost(), 1_500_000.0);

        let flat = TicketRow::from_value(&json!({
            "id": 9,
            "ticketNumber": "",
            "customerName": "Lan",
            "deviceInfo": "Redmi Note 12",
            "issueDescription": "no power",
            "status": "DONE"
        }));
        assert_eq!(flat.customer.name, "Lan");
        assert_eq!(flat.device.model, "Redmi Note 12");
        assert_eq!(flat.initial_issue, "no power");
        assert_eq!(flat.display_code(), "#9");
    }
}
