// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::commands::{
    CheckoutRequest, Command, CustomerCommand, ListArgs, ProductCommand, TicketCommand,
};
use anyhow::{Context, Result, bail};
use shopdesk_api::{Client, ProductDeletion, SessionStore, user_message};
use shopdesk_app::checkout::{Cart, format_vnd};
use shopdesk_app::dashboard::summarize;
use shopdesk_app::export::{CsvExportable, ExportScope, csv_bytes, export_filename, import_products};
use shopdesk_app::forms::{
    CustomerFormInput, LoginInput, ProductFormInput, RegisterInput, RepairTicketFormInput,
    WarrantyLookupInput,
};
use shopdesk_app::query::{
    CustomerFilter, ListQuery, MAX_PAGE_SIZE, ProductFilter, QueryCommand, TicketFilter,
};
use shopdesk_app::rows::{CustomerRow, ProductRow, TicketRow};
use shopdesk_app::{ListRow, ListView, PageEnvelope, SortDirection};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;

const CUSTOMER_SORT: &str = "name";
const PRODUCT_SORT: &str = "name";
const TICKET_SORT: &str = "createdAt";

/// Executes parsed commands against the backend and writes the results
/// to `out`.
pub struct Runtime<W: Write> {
    client: Client,
    sessions: SessionStore,
    page_size: u32,
    export_dir: PathBuf,
    out: W,
}

impl<W: Write> Runtime<W> {
    pub fn new(
        client: Client,
        sessions: SessionStore,
        page_size: u32,
        export_dir: PathBuf,
        out: W,
    ) -> Self {
        Self {
            client,
            sessions,
            page_size,
            export_dir,
            out,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login(input) => self.login(&input),
            Command::Logout => self.logout(),
            Command::Whoami => self.whoami(),
            Command::Register(input) => self.register(&input),
            Command::Customers(command) => self.customers(command),
            Command::Products(command) => self.products(command),
            Command::Tickets(command) => self.tickets(command),
            Command::Warranty(input) => self.warranty(&input),
            Command::Checkout(request) => self.checkout(request),
            Command::Dashboard => self.dashboard(),
        }
    }

    fn login(&mut self, input: &LoginInput) -> Result<()> {
        let session = self.client.login(input)?;
        self.sessions.save(&session)?;
        let who = session.username.as_deref().unwrap_or("unknown user");
        info!(user = who, "logged in");
        writeln!(self.out, "logged in as {who}")?;
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        if self.sessions.clear()? {
            info!("session cleared");
            writeln!(self.out, "logged out")?;
        } else {
            writeln!(self.out, "no saved session")?;
        }
        Ok(())
    }

    fn whoami(&mut self) -> Result<()> {
        match self.sessions.load()? {
            Some(session) => {
                writeln!(
                    self.out,
                    "{} ({})",
                    session.username.as_deref().unwrap_or("unknown user"),
                    session.role.as_deref().unwrap_or("no role"),
                )?;
                writeln!(self.out, "saved {}", session.saved_at)?;
            }
            None => writeln!(self.out, "not logged in -- run shopdesk login")?,
        }
        Ok(())
    }

    fn register(&mut self, input: &RegisterInput) -> Result<()> {
        self.client.register(input)?;
        info!(email = %input.email.trim(), "account registered");
        writeln!(
            self.out,
            "account created for {} -- run shopdesk login to sign in",
            input.email.trim()
        )?;
        Ok(())
    }

    fn customers(&mut self, command: CustomerCommand) -> Result<()> {
        match command {
            CustomerCommand::List(list) => {
                let view = self.customer_view(&list)?;
                let rows: Vec<Vec<String>> = view.rows().iter().map(customer_cells).collect();
                write_table(
                    &mut self.out,
                    &["ID", "Name", "Phone", "Email", "Tier", "Orders", "Spent"],
                    &rows,
                )?;
                write_footer(&mut self.out, &view, "customers")
            }
            CustomerCommand::Show(id) => {
                let row = self.client.get_customer(id)?;
                write_fields(
                    &mut self.out,
                    &[
                        ("ID", id.to_string()),
                        ("Name", row.name.clone()),
                        ("Phone", row.phone.clone()),
                        ("Email", row.email.clone()),
                        ("Birthday", row.birthday.clone()),
                        ("Gender", row.gender.clone()),
                        ("Address", row.address.clone()),
                        ("Tier", row.tier.clone()),
                        ("Orders", row.total_orders.to_string()),
                        ("Spent", format_money(row.total_spent)),
                        ("Last purchase", row.last_purchase.clone()),
                        ("Created", row.created_at.clone()),
                        ("Notes", row.notes.clone()),
                    ],
                )
            }
            CustomerCommand::Create(fields) => {
                let mut form = CustomerFormInput::default();
                fields.apply(&mut form);
                form.validate()?;
                let row = self.client.create_customer(&form.payload())?;
                info!(id = ?row.id, "customer created");
                writeln!(self.out, "created customer {} {}", display_id(row.id), row.name)?;
                Ok(())
            }
            CustomerCommand::Update(id, fields) => {
                let existing = self.client.get_customer(id)?;
                let mut form = CustomerFormInput::from(&existing);
                fields.apply(&mut form);
                form.validate()?;
                let row = self.client.update_customer(id, &form.payload())?;
                info!(%id, "customer updated");
                writeln!(self.out, "updated customer #{id} {}", row.name)?;
                Ok(())
            }
            CustomerCommand::Deactivate(id) => {
                self.client.deactivate_customer(id)?;
                info!(%id, "customer deactivated");
                writeln!(self.out, "deactivated customer #{id}")?;
                Ok(())
            }
            CustomerCommand::Activate(id) => {
                self.client.activate_customer(id)?;
                info!(%id, "customer activated");
                writeln!(self.out, "activated customer #{id}")?;
                Ok(())
            }
            CustomerCommand::BulkDeactivate(ids) => {
                let outcome = self.client.bulk_deactivate_customers(&ids);
                info!(
                    succeeded = outcome.succeeded.len(),
                    failed = outcome.failed.len(),
                    "bulk deactivation finished"
                );
                writeln!(
                    self.out,
                    "deactivated {} of {} customers",
                    outcome.succeeded.len(),
                    ids.len()
                )?;
                for (id, message) in &outcome.failed {
                    writeln!(self.out, "  #{id}: {message}")?;
                }
                if !outcome.is_complete() {
                    bail!(
                        "{} of {} customers could not be deactivated",
                        outcome.failed.len(),
                        ids.len()
                    );
                }
                Ok(())
            }
            CustomerCommand::Stats => {
                let stats = self.client.customer_statistics()?;
                write_fields(
                    &mut self.out,
                    &[
                        ("Active customers", count_text(stats.total_active_customers)),
                        ("Regular", count_text(stats.regular_tier_count)),
                        ("VIP", count_text(stats.vip_tier_count)),
                        ("Potential", count_text(stats.potential_tier_count)),
                        ("New this month", count_text(stats.new_customers_this_month)),
                    ],
                )
            }
            CustomerCommand::Export { list, dated } => {
                let view = self.customer_view(&list)?;
                self.export(&view, dated)
            }
        }
    }

    fn products(&mut self, command: ProductCommand) -> Result<()> {
        match command {
            ProductCommand::List(list) => {
                let view = self.product_view(&list)?;
                let rows: Vec<Vec<String>> = view.rows().iter().map(product_cells).collect();
                write_table(
                    &mut self.out,
                    &["ID", "Name", "Brand", "Category", "Warranty", "Status"],
                    &rows,
                )?;
                write_footer(&mut self.out, &view, "product models")
            }
            ProductCommand::Show(id) => {
                let row = self.client.get_product(id)?;
                write_fields(
                    &mut self.out,
                    &[
                        ("ID", id.to_string()),
                        ("Name", row.name.clone()),
                        ("Brand", brand_text(&row)),
                        ("Category", row.category.clone()),
                        ("Warranty", format!("{} months", row.default_warranty_months)),
                        ("Status", active_text(row.is_active).to_owned()),
                        ("Description", row.description.clone()),
                    ],
                )
            }
            ProductCommand::Create(fields) => {
                let mut form = ProductFormInput::default();
                fields.apply(&mut form);
                let saved = self.client.create_product(&form)?;
                info!(id = ?saved.product.id, "product model created");
                write!(
                    self.out,
                    "created product model {} {}",
                    display_id(saved.product.id),
                    saved.product.name
                )?;
                if saved.activation_changed == Some(false) {
                    write!(self.out, " (inactive)")?;
                }
                writeln!(self.out)?;
                Ok(())
            }
            ProductCommand::Update(id, fields) => {
                let existing = self.client.get_product(id)?;
                let mut form = ProductFormInput::from(&existing);
                fields.apply(&mut form);
                let saved = self.client.update_product(id, &form, existing.is_active)?;
                info!(%id, "product model updated");
                write!(self.out, "updated product model #{id} {}", saved.product.name)?;
                match saved.activation_changed {
                    Some(true) => write!(self.out, " (activated)")?,
                    Some(false) => write!(self.out, " (deactivated)")?,
                    None => {}
                }
                writeln!(self.out)?;
                Ok(())
            }
            ProductCommand::Activate(id) => {
                self.client.activate_product(id)?;
                writeln!(self.out, "activated product model #{id}")?;
                Ok(())
            }
            ProductCommand::Deactivate(id) => {
                self.client.deactivate_product(id)?;
                writeln!(self.out, "deactivated product model #{id}")?;
                Ok(())
            }
            ProductCommand::Delete(id) => {
                let existing = self.client.get_product(id)?;
                match self.client.delete_product(id, existing.is_active)? {
                    ProductDeletion::Deleted { .. } => {
                        writeln!(self.out, "deleted product model #{id} {}", existing.name)?;
                        Ok(())
                    }
                    ProductDeletion::StillReferenced { deactivated_first } => {
                        if deactivated_first {
                            bail!(
                                "product model #{id} is still used by SKUs and cannot be deleted; it was deactivated instead"
                            );
                        }
                        bail!(
                            "product model #{id} is still used by SKUs and cannot be deleted; it stays inactive"
                        );
                    }
                }
            }
            ProductCommand::Import(path) => self.import(&path),
            ProductCommand::Export { list, dated } => {
                let view = self.product_view(&list)?;
                self.export(&view, dated)
            }
        }
    }

    fn import(&mut self, path: &std::path::Path) -> Result<()> {
        let file = fs::File::open(path)
            .with_context(|| format!("open {} -- check the CSV path", path.display()))?;
        let import = import_products(file)?;
        for (line, reason) in &import.skipped {
            writeln!(self.out, "  skipped line {line}: {reason}")?;
        }
        let outcome = self.client.import_products(&import.rows);
        info!(
            imported = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            skipped = import.skipped.len(),
            "product import finished"
        );
        for (line, message) in &outcome.failed {
            writeln!(self.out, "  line {line}: {message}")?;
        }
        let attempted = import.rows.len() + import.skipped.len();
        writeln!(
            self.out,
            "imported {} of {attempted} product models",
            outcome.succeeded.len()
        )?;
        if outcome.succeeded.len() < attempted {
            bail!(
                "{} of {attempted} rows were not imported",
                attempted - outcome.succeeded.len()
            );
        }
        Ok(())
    }

    fn tickets(&mut self, command: TicketCommand) -> Result<()> {
        match command {
            TicketCommand::List(list) => {
                let view = self.ticket_view(&list)?;
                let rows: Vec<Vec<String>> = view.rows().iter().map(ticket_cells).collect();
                write_table(
                    &mut self.out,
                    &["ID", "Code", "Customer", "Device", "Status", "Technician", "Total", "Created"],
                    &rows,
                )?;
                write_footer(&mut self.out, &view, "repair tickets")
            }
            TicketCommand::Show(id) => {
                let row = self.client.get_ticket(id)?;
                write_fields(
                    &mut self.out,
                    &[
                        ("Code", row.display_code()),
                        ("Customer", customer_text(&row)),
                        ("Device", device_text(&row)),
                        ("IMEI", row.device.imei.clone()),
                        ("Issue", row.initial_issue.clone()),
                        ("Status", status_text(&row)),
                        ("Technician", row.technician_name.clone()),
                        ("Due", row.due_date.clone()),
                        ("Parts", format_money(row.parts_cost)),
                        ("Labor", format_money(row.labor_cost)),
                        ("Total", format_money(row.total_cost())),
                        ("Created", row.created_at.clone()),
                        ("Notes", row.notes.clone()),
                    ],
                )
            }
            TicketCommand::Create(fields) => {
                let mut form = RepairTicketFormInput::default();
                fields.apply(&mut form);
                let row = self.client.create_ticket(&form)?;
                info!(id = ?row.id, "repair ticket created");
                writeln!(self.out, "created repair ticket {}", row.display_code())?;
                Ok(())
            }
            TicketCommand::Update(id, fields) => {
                let existing = self.client.get_ticket(id)?;
                let mut form = RepairTicketFormInput::from(&existing);
                fields.apply(&mut form);
                let row = self.client.update_ticket(id, &form)?;
                info!(%id, "repair ticket updated");
                writeln!(self.out, "updated repair ticket {}", row.display_code())?;
                Ok(())
            }
            TicketCommand::Delete(id) => {
                self.client.delete_ticket(id)?;
                info!(%id, "repair ticket deleted");
                writeln!(self.out, "deleted repair ticket #{id}")?;
                Ok(())
            }
            TicketCommand::Status(id, status) => {
                let row = self.client.set_ticket_status(id, status)?;
                info!(%id, status = status.as_str(), "repair ticket status changed");
                writeln!(self.out, "{} is now {}", row.display_code(), status.label())?;
                Ok(())
            }
            TicketCommand::Done(id) => {
                let row = self.client.mark_ticket_done(id)?;
                info!(%id, "repair ticket done");
                writeln!(self.out, "{} is done", row.display_code())?;
                Ok(())
            }
            TicketCommand::Technicians => {
                let technicians = self.client.list_technicians();
                if technicians.is_empty() {
                    writeln!(self.out, "no technicians available")?;
                    return Ok(());
                }
                let rows: Vec<Vec<String>> = technicians
                    .iter()
                    .map(|technician| {
                        vec![
                            technician.id.map(|id| id.to_string()).unwrap_or_default(),
                            technician.name.clone(),
                        ]
                    })
                    .collect();
                write_table(&mut self.out, &["ID", "Name"], &rows)
            }
            TicketCommand::Export { list, dated } => {
                let view = self.ticket_view(&list)?;
                self.export(&view, dated)
            }
        }
    }

    fn warranty(&mut self, input: &WarrantyLookupInput) -> Result<()> {
        if let Some(hint) = input.imei_hint() {
            writeln!(self.out, "note: {hint}")?;
        }
        let Some(found) = self.client.lookup_warranty(input)? else {
            writeln!(self.out, "no warranty record matches that IMEI or phone")?;
            return Ok(());
        };
        write_fields(
            &mut self.out,
            &[
                ("Customer", found.customer.name.clone()),
                ("Phone", found.customer.phone.clone()),
                ("Product", found.device.product_name.clone()),
                ("IMEI", found.device.imei.clone()),
                ("Color", found.device.color.clone()),
                ("SKU", found.device.sku.clone()),
                ("Order", found.order.code.clone()),
                ("Purchased", found.order.date.clone()),
                ("Price", format_money(found.order.price)),
                (
                    "Coverage",
                    format!("{} to {}", found.warranty.start_date, found.warranty.end_date),
                ),
                ("Status", found.warranty.status.clone()),
            ],
        )?;
        if !found.warranty.history.is_empty() {
            writeln!(self.out, "History:")?;
            for event in &found.warranty.history {
                write!(self.out, "  {}  {}", event.at, event.title)?;
                if !event.note.is_empty() {
                    write!(self.out, " ({})", event.note)?;
                }
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn checkout(&mut self, request: CheckoutRequest) -> Result<()> {
        let mut cart = Cart::new(request.lines);
        for (line, qty) in request.quantity_edits {
            cart.set_quantity(line, qty)?;
        }
        if let Some(code) = &request.voucher {
            cart.apply_voucher(code)?;
        }
        let totals = cart.totals(&request.payment);

        let rows: Vec<Vec<String>> = cart
            .lines()
            .iter()
            .map(|line| {
                vec![
                    line.id.to_string(),
                    line.name.clone(),
                    line.qty.to_string(),
                    format_vnd(line.unit_price),
                    format_vnd(line.line_total()),
                ]
            })
            .collect();
        write_table(&mut self.out, &["#", "Item", "Qty", "Price", "Amount"], &rows)?;

        let mut summary = vec![("Subtotal", format_vnd(totals.subtotal))];
        if let Some(voucher) = cart.voucher() {
            summary.push(("Voucher", voucher.code.clone()));
        }
        summary.push(("Discount", format_vnd(totals.discount)));
        summary.push(("Total", format_vnd(totals.total)));
        summary.push((
            request.payment.primary.as_str(),
            format_vnd(totals.primary_amount),
        ));
        if let Some((method, _)) = request.payment.secondary {
            summary.push((method.as_str(), format_vnd(totals.secondary_amount)));
        }
        summary.push(("Received", format_vnd(totals.received)));
        summary.push(("Change", format_vnd(totals.change)));
        write_fields(&mut self.out, &summary)?;

        if !totals.covered {
            bail!(
                "payment does not cover the total -- {} still due",
                format_vnd(totals.total - totals.received)
            );
        }
        Ok(())
    }

    fn dashboard(&mut self) -> Result<()> {
        let statistics = self.client.customer_statistics()?;
        let tickets = self
            .client
            .list_tickets(&ListQuery::new(TICKET_SORT, MAX_PAGE_SIZE))?
            .items;
        let mut top = ListQuery::<CustomerFilter>::new("totalSpent", self.page_size);
        top.dispatch(QueryCommand::SetDirection(SortDirection::Desc), 1);
        let customers = self.client.list_customers(&top)?.items;
        let summary = summarize(statistics, &tickets, &customers);

        writeln!(self.out, "Customers")?;
        write_fields(
            &mut self.out,
            &[
                ("  Active", count_text(summary.statistics.total_active_customers)),
                ("  VIP", count_text(summary.statistics.vip_tier_count)),
                ("  New this month", count_text(summary.statistics.new_customers_this_month)),
                ("  Orders on page", summary.page_orders.to_string()),
                ("  Spend on page", format_money(summary.page_spend)),
                (
                    "  Top spender",
                    summary.top_spender.clone().unwrap_or_else(|| "-".to_owned()),
                ),
            ],
        )?;
        writeln!(self.out, "Repairs ({} open)", summary.open_tickets)?;
        let mut lines: Vec<(String, String)> = summary
            .tickets_by_status
            .iter()
            .map(|(status, count)| (format!("  {}", status.label()), count.to_string()))
            .collect();
        if summary.unrecognized_tickets > 0 {
            lines.push(("  other".to_owned(), summary.unrecognized_tickets.to_string()));
        }
        lines.push(("  revenue".to_owned(), format_money(summary.repair_revenue)));
        write_fields(&mut self.out, &lines)
    }

    fn customer_view(
        &self,
        list: &ListArgs<CustomerFilter>,
    ) -> Result<ListView<CustomerFilter, CustomerRow>> {
        let mut view = ListView::new(list.query(CUSTOMER_SORT, self.page_size));
        load(&mut view, |query| self.client.list_customers(query))?;
        Ok(view)
    }

    fn product_view(
        &self,
        list: &ListArgs<ProductFilter>,
    ) -> Result<ListView<ProductFilter, ProductRow>> {
        let mut view = ListView::new(list.query(PRODUCT_SORT, self.page_size));
        load(&mut view, |query| self.client.list_products(query))?;
        Ok(view)
    }

    fn ticket_view(
        &self,
        list: &ListArgs<TicketFilter>,
    ) -> Result<ListView<TicketFilter, TicketRow>> {
        let mut view = ListView::new(list.query(TICKET_SORT, self.page_size));
        load(&mut view, |query| self.client.list_tickets(query))?;
        Ok(view)
    }

    fn export<F: PartialEq, R: ListRow + CsvExportable>(
        &mut self,
        view: &ListView<F, R>,
        dated: bool,
    ) -> Result<()> {
        let scope = if dated {
            ExportScope::Dated(OffsetDateTime::now_utc().date())
        } else {
            ExportScope::Page(view.query().page)
        };
        let bytes = csv_bytes(view.rows())?;
        fs::create_dir_all(&self.export_dir).with_context(|| {
            format!(
                "create export directory {} -- set [export].dir to a writable path",
                self.export_dir.display()
            )
        })?;
        let path = self.export_dir.join(export_filename(R::ENTITY, scope));
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), rows = view.rows().len(), "export written");
        writeln!(
            self.out,
            "wrote {} {} to {}",
            view.rows().len(),
            R::ENTITY.label(),
            path.display()
        )?;
        Ok(())
    }
}

/// Runs one fetch through the view so a failure leaves it in the failed
/// state, then hands the error back.
fn load<F: PartialEq, R: ListRow>(
    view: &mut ListView<F, R>,
    fetch: impl FnOnce(&ListQuery<F>) -> Result<PageEnvelope<R>>,
) -> Result<()> {
    let ticket = view.begin_fetch();
    match fetch(view.query()) {
        Ok(page) => {
            view.finish_fetch(ticket, Ok(page));
            Ok(())
        }
        Err(error) => {
            view.finish_fetch(ticket, Err(user_message(&error)));
            Err(error)
        }
    }
}

fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let header_cells: Vec<String> = headers.iter().map(|header| (*header).to_owned()).collect();
    write_row(out, &widths, &header_cells)?;
    for row in rows {
        write_row(out, &widths, row)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, widths: &[usize], cells: &[String]) -> Result<()> {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad));
    }
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}

fn write_fields<L: AsRef<str>>(out: &mut impl Write, fields: &[(L, String)]) -> Result<()> {
    let width = fields
        .iter()
        .map(|(label, _)| label.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    for (label, value) in fields {
        let label = label.as_ref();
        let pad = width - label.chars().count();
        let value = if value.is_empty() { "-" } else { value.as_str() };
        writeln!(out, "{label}:{}  {value}", " ".repeat(pad))?;
    }
    Ok(())
}

fn write_footer<F: PartialEq, R: ListRow>(
    out: &mut impl Write,
    view: &ListView<F, R>,
    noun: &str,
) -> Result<()> {
    match view.bounds() {
        Some((first, last)) => writeln!(
            out,
            "{first}-{last} of {} {noun}, page {} of {}",
            view.total_items(),
            view.query().page,
            view.total_pages()
        )?,
        None => writeln!(out, "no {noun} found")?,
    }
    Ok(())
}

fn display_id<T: std::fmt::Display>(id: Option<T>) -> String {
    id.map(|id| format!("#{id}")).unwrap_or_else(|| "(no id)".to_owned())
}

fn count_text(count: Option<i64>) -> String {
    count.map(|count| count.to_string()).unwrap_or_else(|| "-".to_owned())
}

fn format_money(amount: f64) -> String {
    format_vnd(amount.round() as i64)
}

fn active_text(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}

fn brand_text(row: &ProductRow) -> String {
    if !row.brand_name.is_empty() {
        return row.brand_name.clone();
    }
    row.brand_id.map(|id| format!("#{id}")).unwrap_or_default()
}

fn customer_text(row: &TicketRow) -> String {
    match (row.customer.name.is_empty(), row.customer.phone.is_empty()) {
        (false, false) => format!("{} ({})", row.customer.name, row.customer.phone),
        (false, true) => row.customer.name.clone(),
        (true, _) => row.customer.phone.clone(),
    }
}

fn device_text(row: &TicketRow) -> String {
    format!("{} {}", row.device.brand, row.device.model)
        .trim()
        .to_owned()
}

fn status_text(row: &TicketRow) -> String {
    row.status()
        .map(|status| status.label().to_owned())
        .unwrap_or_else(|| row.status.clone())
}

fn customer_cells(row: &CustomerRow) -> Vec<String> {
    vec![
        row.id.map(|id| id.to_string()).unwrap_or_default(),
        row.name.clone(),
        row.phone.clone(),
        row.email.clone(),
        row.tier.clone(),
        row.total_orders.to_string(),
        format_money(row.total_spent),
    ]
}

fn product_cells(row: &ProductRow) -> Vec<String> {
    vec![
        row.id.map(|id| id.to_string()).unwrap_or_default(),
        row.name.clone(),
        brand_text(row),
        row.category.clone(),
        format!("{} mo", row.default_warranty_months),
        active_text(row.is_active).to_owned(),
    ]
}

fn ticket_cells(row: &TicketRow) -> Vec<String> {
    vec![
        row.id.map(|id| id.to_string()).unwrap_or_default(),
        row.display_code(),
        customer_text(row),
        device_text(row),
        status_text(row),
        row.technician_name.clone(),
        format_money(row.total_cost()),
        row.created_at.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::Runtime;
    use crate::commands::Command;
    use anyhow::Result;
    use serde_json::json;
    use shopdesk_api::{Client, Session, SessionStore};
    use shopdesk_testkit::{MockResponse, MockServer, ShopFaker, error_body, spring_page, wrapped};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    fn runtime(base_url: &str, dir: &Path) -> Result<Runtime<Vec<u8>>> {
        let client = Client::new(base_url, Duration::from_secs(5))?;
        Ok(Runtime::new(
            client,
            SessionStore::new(dir.join("session.json")),
            10,
            dir.join("exports"),
            Vec::new(),
        ))
    }

    fn run(runtime: &mut Runtime<Vec<u8>>, args: &[&str]) -> Result<()> {
        runtime.execute(Command::parse(args)?)
    }

    fn output(runtime: Runtime<Vec<u8>>) -> Result<String> {
        Ok(String::from_utf8(runtime.into_output())?)
    }

    #[test]
    fn customer_list_renders_table_and_bounds() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let customers = ShopFaker::new(7).customers(3);
        let server = MockServer::start(vec![MockResponse::ok(&spring_page(
            customers.clone(),
            1,
            3,
            8,
        ))])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        run(&mut runtime, &["customers", "list", "--page", "2", "--size", "3"])?;
        let text = output(runtime)?;
        let requests = server.finish()?;

        assert_eq!(requests[0].query("page").as_deref(), Some("1"));
        assert_eq!(requests[0].query("size").as_deref(), Some("3"));
        assert!(text.starts_with("ID"));
        let first_name = customers[0]["fullName"].as_str().unwrap_or_default();
        assert!(text.contains(first_name), "missing {first_name} in {text}");
        assert!(text.contains("4-6 of 8 customers, page 2 of 3"), "{text}");
        Ok(())
    }

    #[test]
    fn failed_list_surfaces_server_message() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start(vec![MockResponse::json(
            401,
            &error_body(401, "Token expired"),
        )])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        let error = run(&mut runtime, &["tickets"]).expect_err("401 should fail");
        assert_eq!(shopdesk_api::user_message(&error), "Token expired");
        server.finish()?;
        Ok(())
    }

    #[test]
    fn referenced_product_delete_explains_deactivation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start(vec![
            MockResponse::ok(&wrapped(json!({
                "id": 9, "name": "Galaxy A55", "brandId": 2, "category": "PHONE",
                "defaultWarrantyMonths": 12, "isActive": true
            }))),
            MockResponse::empty(200),
            MockResponse::json(
                409,
                &error_body(409, "violates foreign key constraint fk_sku_model"),
            ),
        ])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        let error = run(&mut runtime, &["products", "delete", "9"]).expect_err("still referenced");
        assert!(error.to_string().contains("deactivated instead"), "{error:#}");

        let requests = server.finish()?;
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].path(), "/api/product-models/9/deactivate");
        assert_eq!(requests[2].method, "DELETE");
        Ok(())
    }

    #[test]
    fn login_persists_session_and_logout_clears_it() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start(vec![MockResponse::ok(&wrapped(json!({
            "accessToken": "tok-123",
            "username": "thu.ly",
            "role": "ADMIN"
        })))])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        run(
            &mut runtime,
            &["login", "--username", "thu.ly", "--password", "secret1"],
        )?;
        run(&mut runtime, &["whoami"])?;
        server.finish()?;

        let store = SessionStore::new(dir.path().join("session.json"));
        let saved: Option<Session> = store.load()?;
        assert_eq!(saved.map(|session| session.access_token).as_deref(), Some("tok-123"));

        run(&mut runtime, &["logout"])?;
        run(&mut runtime, &["logout"])?;
        let text = output(runtime)?;
        assert!(text.contains("logged in as thu.ly"));
        assert!(text.contains("thu.ly (ADMIN)"));
        assert!(text.contains("logged out"));
        assert!(text.contains("no saved session"));
        assert!(store.load()?.is_none());
        Ok(())
    }

    #[test]
    fn export_writes_bom_prefixed_csv_named_by_page() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let products = ShopFaker::new(3).products(2);
        let server = MockServer::start(vec![MockResponse::ok(&spring_page(products, 0, 10, 2))])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        run(&mut runtime, &["products", "export"])?;
        server.finish()?;

        let path = dir.path().join("exports").join("product-models-page-1.csv");
        let bytes = fs::read(&path)?;
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec())?;
        assert_eq!(text.lines().count(), 3);
        assert!(output(runtime)?.contains("wrote 2"));
        Ok(())
    }

    #[test]
    fn bulk_deactivate_reports_each_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start_with(3, |request| {
            if request.path().ends_with("/2") {
                MockResponse::json(404, &error_body(404, "Customer not found"))
            } else {
                MockResponse::empty(200)
            }
        })?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        let error = run(&mut runtime, &["customers", "bulk-deactivate", "1,2,3"])
            .expect_err("one failure");
        assert!(error.to_string().contains("1 of 3"));
        server.finish()?;

        let text = output(runtime)?;
        assert!(text.contains("deactivated 2 of 3 customers"));
        assert!(text.contains("#2: Customer not found"));
        Ok(())
    }

    #[test]
    fn checkout_prints_totals_and_change() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut runtime = runtime("http://127.0.0.1:1", dir.path())?;
        run(
            &mut runtime,
            &[
                "checkout",
                "--item",
                "Ốp lưng:2:150000",
                "--item",
                "Cáp sạc:1:90000",
                "--cash",
                "500000",
            ],
        )?;
        let text = output(runtime)?;
        assert!(text.contains("390.000"), "{text}");
        assert!(text.contains("110.000"), "{text}");
        Ok(())
    }

    #[test]
    fn short_payment_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut runtime = runtime("http://127.0.0.1:1", dir.path())?;
        let error = run(
            &mut runtime,
            &["checkout", "--item", "Tai nghe:1:300000", "--cash", "100000"],
        )
        .expect_err("short payment");
        assert!(error.to_string().contains("still due"));
        Ok(())
    }

    #[test]
    fn warranty_miss_is_not_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start(vec![MockResponse::json(
            404,
            &error_body(404, "Not found"),
        )])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        run(&mut runtime, &["warranty", "--imei", "356789012345678"])?;
        server.finish()?;
        assert!(output(runtime)?.contains("no warranty record"));
        Ok(())
    }

    #[test]
    fn import_reports_skipped_and_failed_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("models.csv");
        fs::write(
            &csv_path,
            "brandId,name,category,defaultWarrantyMonths,description,isActive\n\
             1,iPhone 15,PHONE,12,,true\n\
             ,No brand,PHONE,12,,true\n\
             2,Galaxy Watch,SMART WATCH,6,,true\n",
        )?;
        let server = MockServer::start(vec![
            MockResponse::ok(&wrapped(json!({"id": 1, "name": "iPhone 15", "isActive": true}))),
            MockResponse::json(400, &error_body(400, "Name already exists")),
        ])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        let error = run(
            &mut runtime,
            &["products", "import", csv_path.to_str().unwrap_or_default()],
        )
        .expect_err("partial import");
        assert!(error.to_string().contains("2 of 3"));
        server.finish()?;

        let text = output(runtime)?;
        assert!(text.contains("skipped line"), "{text}");
        assert!(text.contains("Name already exists"), "{text}");
        assert!(text.contains("imported 1 of 3"), "{text}");
        Ok(())
    }
    #[test]
    fn dashboard_combines_statistics_tickets_and_top_customers() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut faker = ShopFaker::new(11);
        let tickets = faker.tickets(4);
        let mut customers = faker.customers(2);
        for (customer, (orders, spent)) in customers
            .iter_mut()
            .zip([(3, 1_500_000), (4, 2_250_000)])
        {
            customer["totalOrders"] = json!(orders);
            customer["totalSpent"] = json!(spent);
        }
        let server = MockServer::start(vec![
            MockResponse::ok(&wrapped(json!({
                "totalActiveCustomers": 42,
                "vipTierCount": 5,
                "newCustomersThisMonth": 3,
            }))),
            MockResponse::ok(&spring_page(tickets, 0, 200, 4)),
            MockResponse::ok(&spring_page(customers, 0, 10, 2)),
        ])?;
        let mut runtime = runtime(server.base_url(), dir.path())?;
        run(&mut runtime, &["dashboard"])?;
        let requests = server.finish()?;

        assert_eq!(requests[0].path(), "/api/customers/statistics");
        assert_eq!(requests[1].path(), "/api/repair-tickets");
        assert_eq!(requests[1].query("size").as_deref(), Some("200"));
        assert_eq!(requests[2].query("sort").as_deref(), Some("totalSpent,desc"));

        let text = output(runtime)?;
        assert!(text.contains("Active"), "{text}");
        assert!(text.contains("42"), "{text}");
        assert!(text.contains("Repairs ("), "{text}");
        assert!(text.contains("Orders on page:  7"), "{text}");
        assert!(text.contains("Spend on page:   3.750.000 ₫"), "{text}");
        Ok(())
    }
}
