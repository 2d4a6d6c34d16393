// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Counter checkout math. Amounts are whole Vietnamese dong.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::CartLineId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub name: String,
    pub qty: u32,
    pub unit_price: i64,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.qty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Discount {
    Flat(i64),
    Percent(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voucher {
    pub code: String,
    pub discount: Discount,
}

impl Voucher {
    /// Known counter codes; lookup is case-insensitive.
    pub fn lookup(code: &str) -> Result<Option<Self>> {
        let code = code.trim().to_uppercase();
        let discount = match code.as_str() {
            "" => return Ok(None),
            "GIAM50K" => Discount::Flat(50_000),
            "GIAM10" => Discount::Percent(10),
            "FREESHIP" => Discount::Flat(30_000),
            _ => bail!("voucher {code:?} is invalid or expired -- check the code and retry"),
        };
        Ok(Some(Self { code, discount }))
    }

    pub fn discount_for(&self, subtotal: i64) -> i64 {
        match self.discount {
            Discount::Flat(amount) => amount.min(subtotal),
            Discount::Percent(percent) => subtotal.saturating_mul(i64::from(percent)) / 100,
        }
        .max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Qr,
    Bank,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "qr" => Some(Self::Qr),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Qr => "qr",
            Self::Bank => "bank",
        }
    }
}

/// How the customer pays. With a second method the first one covers
/// whatever the second leaves, unless it is cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub primary: PaymentMethod,
    /// Cash handed over when the primary method is cash.
    pub cash_received: i64,
    pub secondary: Option<(PaymentMethod, i64)>,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            primary: PaymentMethod::Cash,
            cash_received: 0,
            secondary: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub primary_amount: i64,
    pub secondary_amount: i64,
    pub received: i64,
    pub covered: bool,
    pub change: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    voucher: Option<Voucher>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self {
            lines: lines.into_iter().filter(|line| line.qty > 0).collect(),
            voucher: None,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn voucher(&self) -> Option<&Voucher> {
        self.voucher.as_ref()
    }

    /// Zero removes the line.
    pub fn set_quantity(&mut self, id: CartLineId, qty: u32) -> Result<()> {
        let Some(index) = self.lines.iter().position(|line| line.id == id) else {
            bail!("cart line {id} not found -- list the cart and retry");
        };
        if qty == 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].qty = qty;
        }
        Ok(())
    }

    /// An empty code clears the voucher; an unknown one clears it and errors.
    pub fn apply_voucher(&mut self, code: &str) -> Result<()> {
        self.voucher = None;
        self.voucher = Voucher::lookup(code)?;
        Ok(())
    }

    /// Saturates like [`CartLine::line_total`].
    pub fn subtotal(&self) -> i64 {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(0, i64::saturating_add)
    }

    pub fn totals(&self, payment: &Payment) -> Totals {
        let subtotal = self.subtotal();
        let discount = self
            .voucher
            .as_ref()
            .map_or(0, |voucher| voucher.discount_for(subtotal));
        let total = (subtotal - discount).max(0);

        let secondary_amount = payment.secondary.map_or(0, |(_, amount)| amount.max(0));
        let primary_amount = match (payment.primary, payment.secondary.is_some()) {
            (PaymentMethod::Cash, _) => payment.cash_received.max(0),
            (_, true) => (total - secondary_amount).max(0),
            (_, false) => total,
        };
        let received = primary_amount.saturating_add(secondary_amount);
        let covered = match (payment.primary, payment.secondary.is_some()) {
            (_, true) => received >= total,
            (PaymentMethod::Cash, false) => primary_amount >= total,
            (_, false) => true,
        };

        Totals {
            subtotal,
            discount,
            total,
            primary_amount,
            secondary_amount,
            received,
            covered,
            change: (received - total).max(0),
        }
    }
}

/// `1250000` becomes `1.250.000 ₫`.
pub fn format_vnd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} ₫")
}
