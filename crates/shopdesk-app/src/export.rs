// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! CSV export for list pages and CSV import for product models.
//!
//! Exports start with a UTF-8 BOM so spreadsheet tools pick the right
//! encoding for Vietnamese names.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use time::Date;

use crate::dates::iso_date;
use crate::forms::ProductFormInput;
use crate::rows::{CustomerRow, ProductRow, TicketRow};
use crate::{BrandId, EntityKind};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Rows that know their own CSV columns.
pub trait CsvExportable {
    const ENTITY: EntityKind;

    fn headers() -> &'static [&'static str];

    fn csv_record(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// 1-based UI page.
    Page(u32),
    Dated(Date),
}

pub fn export_filename(entity: EntityKind, scope: ExportScope) -> String {
    match scope {
        ExportScope::Page(page) => format!("{}-page-{page}.csv", entity.slug()),
        ExportScope::Dated(date) => format!("{}-{}.csv", entity.slug(), iso_date(date)),
    }
}

pub fn write_csv<T: CsvExportable, W: Write>(rows: &[T], mut out: W) -> Result<()> {
    out.write_all(UTF8_BOM).context("write CSV byte order mark")?;
    let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(out);
    writer
        .write_record(T::headers())
        .context("write CSV header row")?;
    for row in rows {
        writer
            .write_record(row.csv_record())
            .with_context(|| format!("write {} CSV row", T::ENTITY.label()))?;
    }
    writer.flush().context("flush CSV output")?;
    Ok(())
}

pub fn csv_bytes<T: CsvExportable>(rows: &[T]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    Ok(buffer)
}

fn whole(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

impl CsvExportable for CustomerRow {
    const ENTITY: EntityKind = EntityKind::Customers;

    fn headers() -> &'static [&'static str] {
        &[
            "Name", "Email", "Phone", "Address", "Tier", "Orders", "Spent",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.tier.clone(),
            self.total_orders.to_string(),
            whole(self.total_spent),
        ]
    }
}

impl CsvExportable for ProductRow {
    const ENTITY: EntityKind = EntityKind::ProductModels;

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Category", "Brand", "Warranty (months)", "Status"]
    }

    fn csv_record(&self) -> Vec<String> {
        let brand = match (self.brand_name.trim(), self.brand_id) {
            ("", Some(id)) => id.to_string(),
            (name, _) => name.to_owned(),
        };
        vec![
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.category.clone(),
            brand,
            self.default_warranty_months.to_string(),
            String::from(if self.is_active { "Active" } else { "Inactive" }),
        ]
    }
}

impl CsvExportable for TicketRow {
    const ENTITY: EntityKind = EntityKind::RepairTickets;

    fn headers() -> &'static [&'static str] {
        &[
            "Code", "Customer", "Phone", "Device", "IMEI", "Issue", "Status", "Due", "Total",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        let device = format!("{} {}", self.device.brand, self.device.model);
        vec![
            self.display_code(),
            self.customer.name.clone(),
            self.customer.phone.clone(),
            device.trim().to_owned(),
            self.device.imei.clone(),
            self.initial_issue.clone(),
            self.status.clone(),
            self.due_date.chars().take(10).collect(),
            whole(self.total_cost()),
        ]
    }
}

pub const PRODUCT_IMPORT_HEADERS: [&str; 5] = [
    "brandId",
    "name",
    "category",
    "defaultWarrantyMonths",
    "description",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductImport {
    /// Valid rows keyed by 1-based data line number.
    pub rows: Vec<(usize, ProductFormInput)>,
    pub skipped: Vec<(usize, String)>,
}

/// Reads product form inputs from a CSV file with a header row.
/// Header names match case-insensitively; unknown columns are ignored.
pub fn import_products<R: Read>(input: R) -> Result<ProductImport> {
    let mut text = String::new();
    let mut input = input;
    input
        .read_to_string(&mut text)
        .context("read product CSV -- save the file as UTF-8 and retry")?;
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("read product CSV header row")?.clone();

    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let Some(name_column) = column("name") else {
        bail!(
            "product CSV has no name column -- expected headers {}",
            PRODUCT_IMPORT_HEADERS.join(",")
        );
    };
    let brand_column = column("brandId");
    let category_column = column("category");
    let months_column = column("defaultWarrantyMonths");
    let description_column = column("description");

    let mut import = ProductImport::default();
    for (index, record) in reader.records().enumerate() {
        let line = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                import.skipped.push((line, error.to_string()));
                continue;
            }
        };
        let field = |column: Option<usize>| {
            column
                .and_then(|column| record.get(column))
                .unwrap_or_default()
                .to_owned()
        };

        let brand_text = field(brand_column);
        let Ok(brand_id) = brand_text.parse::<i64>() else {
            import
                .skipped
                .push((line, format!("brandId {brand_text:?} is not a number")));
            continue;
        };
        let months_text = field(months_column);
        let default_warranty_months = if months_text.is_empty() {
            0
        } else if let Ok(months) = months_text.parse::<i64>() {
            months
        } else {
            import.skipped.push((
                line,
                format!("defaultWarrantyMonths {months_text:?} is not a number"),
            ));
            continue;
        };

        let form = ProductFormInput {
            brand_id: BrandId::new(brand_id),
            name: field(Some(name_column)),
            category: field(category_column),
            default_warranty_months,
            description: field(description_column),
            is_active: true,
        };
        match form.validate() {
            Ok(()) => import.rows.push((line, form)),
            Err(error) => import.skipped.push((line, error.to_string())),
        }
    }
    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::{CsvExportable, ExportScope, UTF8_BOM, csv_bytes, export_filename, import_products};
    use crate::EntityKind;
    use crate::rows::{CustomerRow, ProductRow};
    use anyhow::Result;
    use serde_json::json;
    use time::{Date, Month};

    #[test]
    fn filenames_follow_entity_and_scope() {
        assert_eq!(
            export_filename(EntityKind::Customers, ExportScope::Page(3)),
            "customers-page-3.csv"
        );
        let date = Date::from_calendar_date(2025, Month::January, 9).expect("valid date");
        assert_eq!(
            export_filename(EntityKind::ProductModels, ExportScope::Dated(date)),
            "product-models-2025-01-09.csv"
        );
    }

    #[test]
    fn export_starts_with_bom_and_header() -> Result<()> {
        let rows = vec![CustomerRow::from_value(&json!({"fullName": "An", "totalSpent": 1500000}))];
        let bytes = csv_bytes(&rows)?;
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..])?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Name,Email,Phone,Address,Tier,Orders,Spent"));
        assert_eq!(lines.next(), Some("An,,,,REGULAR,0,1500000"));
        Ok(())
    }

    #[test]
    fn awkward_values_survive_a_csv_reader() -> Result<()> {
        let awkward = "12 \"Hai Ba Trung\", Q1\r\nHCMC";
        let rows = vec![CustomerRow::from_value(&json!({
            "fullName": "Pham, Binh",
            "fullAddress": awkward,
            "note": "ignored in export"
        }))];
        let bytes = csv_bytes(&rows)?;

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "Pham, Binh");
        assert_eq!(&records[0][3], awkward);
        assert_eq!(records[0].len(), CustomerRow::headers().len());
        Ok(())
    }

    #[test]
    fn product_export_falls_back_to_brand_id() {
        let row = ProductRow::from_value(&json!({"id": 3, "name": "Case", "brandId": 7, "isActive": false}));
        let record = row.csv_record();
        assert_eq!(record[3], "7");
        assert_eq!(record[5], "Inactive");
    }

    #[test]
    fn import_maps_headers_and_reports_bad_rows() -> Result<()> {
        let csv = "\u{FEFF}Name,BrandId,Category,DefaultWarrantyMonths,Description,Extra\n\
                   iPhone 15,2,phone,12,\"128GB, black\",x\n\
                   Case,abc,accessory,,,\n\
                   ,3,phone,6,,\n\
                   Charger,4,accessory,,fast,\n";
        let import = import_products(csv.as_bytes())?;

        assert_eq!(import.rows.len(), 2);
        let (line, first) = &import.rows[0];
        assert_eq!(*line, 1);
        assert_eq!(first.name, "iPhone 15");
        assert_eq!(first.brand_id.get(), 2);
        assert_eq!(first.description, "128GB, black");
        assert_eq!(import.rows[1].0, 4);
        assert_eq!(import.rows[1].1.default_warranty_months, 0);

        let skipped_lines: Vec<usize> = import.skipped.iter().map(|(line, _)| *line).collect();
        assert_eq!(skipped_lines, vec![2, 3]);
        assert!(import.skipped[0].1.contains("brandId"));
        Ok(())
    }

    #[test]
    fn import_requires_name_column() {
        let error = import_products("brandId,category\n1,phone\n".as_bytes())
            .expect_err("missing name column");
        assert!(error.to_string().contains("name column"));
    }
}
