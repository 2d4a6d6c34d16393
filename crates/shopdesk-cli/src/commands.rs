// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use shopdesk_app::checkout::{CartLine, Payment, PaymentMethod};
use shopdesk_app::dates::parse_iso_date;
use shopdesk_app::forms::{
    CustomerFormInput, LoginInput, ProductFormInput, RegisterInput, RepairTicketFormInput,
    WarrantyLookupInput,
};
use shopdesk_app::query::{
    CustomerFilter, ListQuery, ProductFilter, QueryCommand, TicketFilter,
};
use shopdesk_app::{
    BrandId, CartLineId, CustomerId, CustomerTier, ProductModelId, RepairTicketId, SortDirection,
    TechnicianId, TicketStatus,
};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Options that never take a value.
const FLAGS: [&str; 6] = [
    "--desc",
    "--asc",
    "--active",
    "--inactive",
    "--dated",
    "--agree-terms",
];

const LIST_OPTIONS: [&str; 6] = ["--search", "--sort", "--desc", "--asc", "--page", "--size"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ArgList {
    words: Vec<String>,
    options: Vec<(String, String)>,
    flags: Vec<String>,
}

impl ArgList {
    fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let arg = arg.as_ref();
            if !arg.starts_with("--") {
                list.words.push(arg.to_owned());
                continue;
            }
            if let Some((name, value)) = arg.split_once('=') {
                list.options.push((name.to_owned(), value.to_owned()));
                continue;
            }
            if FLAGS.contains(&arg) {
                list.flags.push(arg.to_owned());
                continue;
            }
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("{arg} requires a value"))?;
            list.options.push((arg.to_owned(), value.as_ref().to_owned()));
        }
        Ok(list)
    }

    /// Rejects options the command does not know and extra positional words.
    fn check(&self, usage: &str, allowed: &[&str], max_words: usize) -> Result<()> {
        let unknown = self
            .options
            .iter()
            .map(|(name, _)| name)
            .chain(&self.flags)
            .find(|name| !allowed.contains(&name.as_str()));
        if let Some(name) = unknown {
            bail!("unknown option {name} for `shopdesk {usage}`; run shopdesk --help");
        }
        if let Some(extra) = self.words.get(max_words) {
            bail!("unexpected argument {extra:?} for `shopdesk {usage}`; run shopdesk --help");
        }
        Ok(())
    }

    fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value.as_str())
    }

    fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.options
            .iter()
            .filter(move |(option, _)| option == name)
            .map(|(_, value)| value.as_str())
    }

    fn text(&self, name: &str) -> Option<String> {
        self.value(name).map(str::to_owned)
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag == name)
    }

    fn number<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.value(name)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|error| anyhow!("{name} expects a number, got {raw:?} ({error})"))
            })
            .transpose()
    }

    fn id<T: From<i64>>(&self, index: usize, usage: &str) -> Result<T> {
        let raw = self
            .word(index)
            .ok_or_else(|| anyhow!("`shopdesk {usage}` needs an id; run shopdesk --help"))?;
        parse_id(raw).map(T::from)
    }

    fn active_flag(&self) -> Result<Option<bool>> {
        match (self.flag("--active"), self.flag("--inactive")) {
            (true, true) => bail!("--active and --inactive cannot be combined"),
            (true, false) => Ok(Some(true)),
            (false, true) => Ok(Some(false)),
            (false, false) => Ok(None),
        }
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    let id: i64 = raw
        .trim()
        .trim_start_matches('#')
        .parse()
        .with_context(|| format!("id {raw:?} is not a number"))?;
    if id <= 0 {
        bail!("id {raw:?} must be positive");
    }
    Ok(id)
}

fn parse_date_option(args: &ArgList, name: &str) -> Result<Option<time::Date>> {
    args.value(name)
        .map(|raw| {
            parse_iso_date(raw.trim())
                .ok_or_else(|| anyhow!("{name} expects a date as YYYY-MM-DD, got {raw:?}"))
        })
        .transpose()
}

fn parse_status(raw: &str) -> Result<TicketStatus> {
    TicketStatus::parse(&raw.replace('-', "_")).ok_or_else(|| {
        let known: Vec<&str> = TicketStatus::ALL.iter().map(|status| status.as_str()).collect();
        anyhow!("unknown ticket status {raw:?}; use one of {}", known.join(", "))
    })
}

/// Paging, sorting and filtering shared by list and export commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs<F> {
    pub keyword: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub filter: F,
}

impl<F: Clone + Default + PartialEq> ListArgs<F> {
    fn parse(args: &ArgList, filter: F) -> Result<Self> {
        let direction = match (args.flag("--asc"), args.flag("--desc")) {
            (true, true) => bail!("--asc and --desc cannot be combined"),
            (true, false) => Some(SortDirection::Asc),
            (false, true) => Some(SortDirection::Desc),
            (false, false) => None,
        };
        Ok(Self {
            keyword: args.text("--search"),
            sort: args.text("--sort"),
            direction,
            page: args.number("--page")?,
            size: args.number("--size")?,
            filter,
        })
    }

    /// Builds the query the same way a list screen would, one change at a
    /// time. The page is taken as given; the server decides whether it
    /// exists.
    pub fn query(&self, default_sort: &str, default_size: u32) -> ListQuery<F> {
        let mut query = ListQuery::new(default_sort, default_size);
        if let Some(size) = self.size {
            query.dispatch(QueryCommand::PageSize(size), 1);
        }
        if let Some(keyword) = &self.keyword {
            query.dispatch(QueryCommand::Search(keyword.clone()), 1);
        }
        query.dispatch(QueryCommand::Filter(self.filter.clone()), 1);
        if let Some(sort) = &self.sort
            && *sort != query.sort_key
        {
            query.dispatch(QueryCommand::SortBy(sort.clone()), 1);
        }
        if let Some(direction) = self.direction {
            query.dispatch(QueryCommand::SetDirection(direction), 1);
        }
        if let Some(page) = self.page {
            query.dispatch(QueryCommand::GoToPage(page), u32::MAX);
        }
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFields {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub tier: Option<String>,
}

const CUSTOMER_FIELD_OPTIONS: [&str; 8] = [
    "--name",
    "--phone",
    "--email",
    "--birthday",
    "--gender",
    "--address",
    "--note",
    "--tier",
];

impl CustomerFields {
    fn parse(args: &ArgList) -> Self {
        Self {
            full_name: args.text("--name"),
            phone: args.text("--phone"),
            email: args.text("--email"),
            birthday: args.text("--birthday"),
            gender: args.text("--gender"),
            address: args.text("--address"),
            note: args.text("--note"),
            tier: args.text("--tier"),
        }
    }

    pub fn apply(&self, form: &mut CustomerFormInput) {
        let targets = [
            (&self.full_name, &mut form.full_name),
            (&self.phone, &mut form.phone),
            (&self.email, &mut form.email),
            (&self.birthday, &mut form.birthday),
            (&self.gender, &mut form.gender),
            (&self.address, &mut form.address),
            (&self.note, &mut form.note),
            (&self.tier, &mut form.tier),
        ];
        for (value, target) in targets {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub brand_id: Option<BrandId>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub default_warranty_months: Option<i64>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

const PRODUCT_FIELD_OPTIONS: [&str; 7] = [
    "--brand",
    "--name",
    "--category",
    "--warranty",
    "--description",
    "--active",
    "--inactive",
];

impl ProductFields {
    fn parse(args: &ArgList) -> Result<Self> {
        Ok(Self {
            brand_id: args.number::<i64>("--brand")?.map(BrandId::new),
            name: args.text("--name"),
            category: args.text("--category"),
            default_warranty_months: args.number("--warranty")?,
            description: args.text("--description"),
            active: args.active_flag()?,
        })
    }

    pub fn apply(&self, form: &mut ProductFormInput) {
        if let Some(brand_id) = self.brand_id {
            form.brand_id = brand_id;
        }
        if let Some(name) = &self.name {
            form.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            form.category.clone_from(category);
        }
        if let Some(months) = self.default_warranty_months {
            form.default_warranty_months = months;
        }
        if let Some(description) = &self.description {
            form.description.clone_from(description);
        }
        if let Some(active) = self.active {
            form.is_active = active;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFields {
    pub code: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub imei: Option<String>,
    pub issue: Option<String>,
    pub technician_id: Option<TechnicianId>,
    pub status: Option<TicketStatus>,
    pub due_date: Option<String>,
    pub parts_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub notes: Option<String>,
}

const TICKET_FIELD_OPTIONS: [&str; 14] = [
    "--code",
    "--customer-id",
    "--customer",
    "--phone",
    "--brand",
    "--model",
    "--imei",
    "--issue",
    "--technician",
    "--status",
    "--due",
    "--parts",
    "--labor",
    "--notes",
];

impl TicketFields {
    fn parse(args: &ArgList) -> Result<Self> {
        Ok(Self {
            code: args.text("--code"),
            customer_id: args
                .value("--customer-id")
                .map(parse_id)
                .transpose()?
                .map(CustomerId::new),
            customer_name: args.text("--customer"),
            customer_phone: args.text("--phone"),
            device_brand: args.text("--brand"),
            device_model: args.text("--model"),
            imei: args.text("--imei"),
            issue: args.text("--issue"),
            technician_id: args
                .value("--technician")
                .map(parse_id)
                .transpose()?
                .map(TechnicianId::new),
            status: args.value("--status").map(parse_status).transpose()?,
            due_date: args.text("--due"),
            parts_cost: args.number("--parts")?,
            labor_cost: args.number("--labor")?,
            notes: args.text("--notes"),
        })
    }

    pub fn apply(&self, form: &mut RepairTicketFormInput) {
        let text_targets = [
            (&self.code, &mut form.code),
            (&self.customer_name, &mut form.customer.name),
            (&self.customer_phone, &mut form.customer.phone),
            (&self.device_brand, &mut form.device.brand),
            (&self.device_model, &mut form.device.model),
            (&self.imei, &mut form.device.imei),
            (&self.issue, &mut form.initial_issue),
            (&self.due_date, &mut form.due_date),
            (&self.notes, &mut form.notes),
        ];
        for (value, target) in text_targets {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        if self.customer_id.is_some() {
            form.customer.id = self.customer_id;
        }
        if self.technician_id.is_some() {
            form.technician_id = self.technician_id;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(cost) = self.parts_cost {
            form.parts_cost = cost;
        }
        if let Some(cost) = self.labor_cost {
            form.labor_cost = cost;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    /// Quantity edits applied after the cart is built; zero removes a line.
    pub quantity_edits: Vec<(CartLineId, u32)>,
    pub voucher: Option<String>,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomerCommand {
    List(ListArgs<CustomerFilter>),
    Show(CustomerId),
    Create(CustomerFields),
    Update(CustomerId, CustomerFields),
    Deactivate(CustomerId),
    Activate(CustomerId),
    BulkDeactivate(Vec<CustomerId>),
    Stats,
    Export { list: ListArgs<CustomerFilter>, dated: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductCommand {
    List(ListArgs<ProductFilter>),
    Show(ProductModelId),
    Create(ProductFields),
    Update(ProductModelId, ProductFields),
    Activate(ProductModelId),
    Deactivate(ProductModelId),
    Delete(ProductModelId),
    Import(PathBuf),
    Export { list: ListArgs<ProductFilter>, dated: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TicketCommand {
    List(ListArgs<TicketFilter>),
    Show(RepairTicketId),
    Create(TicketFields),
    Update(RepairTicketId, TicketFields),
    Delete(RepairTicketId),
    Status(RepairTicketId, TicketStatus),
    Done(RepairTicketId),
    Technicians,
    Export { list: ListArgs<TicketFilter>, dated: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(LoginInput),
    Logout,
    Whoami,
    Register(RegisterInput),
    Customers(CustomerCommand),
    Products(ProductCommand),
    Tickets(TicketCommand),
    Warranty(WarrantyLookupInput),
    Checkout(CheckoutRequest),
    Dashboard,
}

impl Command {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args = ArgList::parse(args)?;
        let group = args.word(0).unwrap_or_default();
        match group {
            "login" => {
                args.check("login", &["--username", "--email", "--password"], 1)?;
                Ok(Self::Login(LoginInput {
                    username: args.text("--username").unwrap_or_default(),
                    email: args.text("--email").unwrap_or_default(),
                    password: args.text("--password").unwrap_or_default(),
                }))
            }
            "logout" => {
                args.check("logout", &[], 1)?;
                Ok(Self::Logout)
            }
            "whoami" => {
                args.check("whoami", &[], 1)?;
                Ok(Self::Whoami)
            }
            "register" => {
                args.check(
                    "register",
                    &[
                        "--name",
                        "--email",
                        "--phone",
                        "--password",
                        "--confirm",
                        "--agree-terms",
                    ],
                    1,
                )?;
                Ok(Self::Register(RegisterInput {
                    full_name: args.text("--name").unwrap_or_default(),
                    email: args.text("--email").unwrap_or_default(),
                    phone: args.text("--phone").unwrap_or_default(),
                    password: args.text("--password").unwrap_or_default(),
                    confirm_password: args.text("--confirm").unwrap_or_default(),
                    agree_terms: args.flag("--agree-terms"),
                }))
            }
            "customers" => parse_customers(&args).map(Self::Customers),
            "products" => parse_products(&args).map(Self::Products),
            "tickets" => parse_tickets(&args).map(Self::Tickets),
            "warranty" => {
                args.check("warranty", &["--imei", "--phone"], 1)?;
                Ok(Self::Warranty(WarrantyLookupInput {
                    imei: args.text("--imei").unwrap_or_default(),
                    phone: args.text("--phone").unwrap_or_default(),
                }))
            }
            "checkout" => parse_checkout(&args).map(Self::Checkout),
            "dashboard" => {
                args.check("dashboard", &[], 1)?;
                Ok(Self::Dashboard)
            }
            "" => bail!("no command given; run shopdesk --help"),
            unknown => bail!("unknown command {unknown:?}; run shopdesk --help to see commands"),
        }
    }
}

fn with_list_options<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    LIST_OPTIONS.iter().copied().chain(extra.iter().copied()).collect()
}

fn parse_customers(args: &ArgList) -> Result<CustomerCommand> {
    let action = args.word(1).unwrap_or("list");
    let usage = format!("customers {action}");
    let list_filter = || -> Result<CustomerFilter> {
        let tier = args
            .value("--tier")
            .map(|raw| {
                CustomerTier::parse(raw)
                    .ok_or_else(|| anyhow!("unknown tier {raw:?}; use REGULAR, VIP or POTENTIAL"))
            })
            .transpose()?;
        Ok(CustomerFilter { tier })
    };
    match action {
        "list" => {
            args.check(&usage, &with_list_options(&["--tier"]), 2)?;
            Ok(CustomerCommand::List(ListArgs::parse(args, list_filter()?)?))
        }
        "export" => {
            args.check(&usage, &with_list_options(&["--tier", "--dated"]), 2)?;
            Ok(CustomerCommand::Export {
                list: ListArgs::parse(args, list_filter()?)?,
                dated: args.flag("--dated"),
            })
        }
        "show" => {
            args.check(&usage, &[], 3)?;
            Ok(CustomerCommand::Show(args.id(2, &usage)?))
        }
        "create" => {
            args.check(&usage, &CUSTOMER_FIELD_OPTIONS, 2)?;
            Ok(CustomerCommand::Create(CustomerFields::parse(args)))
        }
        "update" => {
            args.check(&usage, &CUSTOMER_FIELD_OPTIONS, 3)?;
            Ok(CustomerCommand::Update(
                args.id(2, &usage)?,
                CustomerFields::parse(args),
            ))
        }
        "deactivate" => {
            args.check(&usage, &[], 3)?;
            Ok(CustomerCommand::Deactivate(args.id(2, &usage)?))
        }
        "activate" => {
            args.check(&usage, &[], 3)?;
            Ok(CustomerCommand::Activate(args.id(2, &usage)?))
        }
        "bulk-deactivate" => {
            args.check(&usage, &[], usize::MAX)?;
            let ids = args.words[2..]
                .iter()
                .flat_map(|word| word.split(','))
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| parse_id(raw).map(CustomerId::new))
                .collect::<Result<Vec<_>>>()?;
            if ids.is_empty() {
                bail!("`shopdesk {usage}` needs at least one id");
            }
            Ok(CustomerCommand::BulkDeactivate(ids))
        }
        "stats" => {
            args.check(&usage, &[], 2)?;
            Ok(CustomerCommand::Stats)
        }
        unknown => bail!("unknown customers action {unknown:?}; run shopdesk --help"),
    }
}

fn parse_products(args: &ArgList) -> Result<ProductCommand> {
    let action = args.word(1).unwrap_or("list");
    let usage = format!("products {action}");
    let list_filter = || -> Result<ProductFilter> {
        Ok(ProductFilter {
            active: args.active_flag()?,
            brand_id: args.number::<i64>("--brand")?.map(BrandId::new),
            category: args.text("--category"),
        })
    };
    let filter_options = ["--active", "--inactive", "--brand", "--category"];
    match action {
        "list" => {
            args.check(&usage, &with_list_options(&filter_options), 2)?;
            Ok(ProductCommand::List(ListArgs::parse(args, list_filter()?)?))
        }
        "export" => {
            let mut allowed = with_list_options(&filter_options);
            allowed.push("--dated");
            args.check(&usage, &allowed, 2)?;
            Ok(ProductCommand::Export {
                list: ListArgs::parse(args, list_filter()?)?,
                dated: args.flag("--dated"),
            })
        }
        "show" => {
            args.check(&usage, &[], 3)?;
            Ok(ProductCommand::Show(args.id(2, &usage)?))
        }
        "create" => {
            args.check(&usage, &PRODUCT_FIELD_OPTIONS, 2)?;
            Ok(ProductCommand::Create(ProductFields::parse(args)?))
        }
        "update" => {
            args.check(&usage, &PRODUCT_FIELD_OPTIONS, 3)?;
            Ok(ProductCommand::Update(
                args.id(2, &usage)?,
                ProductFields::parse(args)?,
            ))
        }
        "activate" => {
            args.check(&usage, &[], 3)?;
            Ok(ProductCommand::Activate(args.id(2, &usage)?))
        }
        "deactivate" => {
            args.check(&usage, &[], 3)?;
            Ok(ProductCommand::Deactivate(args.id(2, &usage)?))
        }
        "delete" => {
            args.check(&usage, &[], 3)?;
            Ok(ProductCommand::Delete(args.id(2, &usage)?))
        }
        "import" => {
            args.check(&usage, &[], 3)?;
            let path = args
                .word(2)
                .ok_or_else(|| anyhow!("`shopdesk {usage}` needs a CSV file path"))?;
            Ok(ProductCommand::Import(PathBuf::from(path)))
        }
        unknown => bail!("unknown products action {unknown:?}; run shopdesk --help"),
    }
}

fn parse_tickets(args: &ArgList) -> Result<TicketCommand> {
    let action = args.word(1).unwrap_or("list");
    let usage = format!("tickets {action}");
    let list_filter = || -> Result<TicketFilter> {
        Ok(TicketFilter {
            status: args.value("--status").map(parse_status).transpose()?,
            from: parse_date_option(args, "--from")?,
            to: parse_date_option(args, "--to")?,
        })
    };
    let filter_options = ["--status", "--from", "--to"];
    match action {
        "list" => {
            args.check(&usage, &with_list_options(&filter_options), 2)?;
            Ok(TicketCommand::List(ListArgs::parse(args, list_filter()?)?))
        }
        "export" => {
            let mut allowed = with_list_options(&filter_options);
            allowed.push("--dated");
            args.check(&usage, &allowed, 2)?;
            Ok(TicketCommand::Export {
                list: ListArgs::parse(args, list_filter()?)?,
                dated: args.flag("--dated"),
            })
        }
        "show" => {
            args.check(&usage, &[], 3)?;
            Ok(TicketCommand::Show(args.id(2, &usage)?))
        }
        "create" => {
            args.check(&usage, &TICKET_FIELD_OPTIONS, 2)?;
            Ok(TicketCommand::Create(TicketFields::parse(args)?))
        }
        "update" => {
            args.check(&usage, &TICKET_FIELD_OPTIONS, 3)?;
            Ok(TicketCommand::Update(
                args.id(2, &usage)?,
                TicketFields::parse(args)?,
            ))
        }
        "delete" => {
            args.check(&usage, &[], 3)?;
            Ok(TicketCommand::Delete(args.id(2, &usage)?))
        }
        "status" => {
            args.check(&usage, &[], 4)?;
            let id = args.id(2, &usage)?;
            let status = args
                .word(3)
                .ok_or_else(|| anyhow!("`shopdesk {usage}` needs a status after the id"))?;
            Ok(TicketCommand::Status(id, parse_status(status)?))
        }
        "done" => {
            args.check(&usage, &[], 3)?;
            Ok(TicketCommand::Done(args.id(2, &usage)?))
        }
        "technicians" => {
            args.check(&usage, &[], 2)?;
            Ok(TicketCommand::Technicians)
        }
        unknown => bail!("unknown tickets action {unknown:?}; run shopdesk --help"),
    }
}

fn parse_checkout(args: &ArgList) -> Result<CheckoutRequest> {
    args.check(
        "checkout",
        &["--item", "--qty", "--voucher", "--pay", "--cash", "--split"],
        1,
    )?;

    let lines = args
        .values("--item")
        .enumerate()
        .map(|(index, raw)| parse_cart_line(index, raw))
        .collect::<Result<Vec<_>>>()?;
    if lines.is_empty() {
        bail!("checkout needs at least one --item NAME:QTY:PRICE");
    }

    let quantity_edits = args
        .values("--qty")
        .map(|raw| {
            let (line, qty) = raw
                .split_once(':')
                .ok_or_else(|| anyhow!("--qty expects LINE:QTY, got {raw:?}"))?;
            let line = parse_id(line)?;
            let qty: u32 = qty
                .trim()
                .parse()
                .with_context(|| format!("--qty quantity {qty:?} is not a number"))?;
            Ok((CartLineId::new(line), qty))
        })
        .collect::<Result<Vec<_>>>()?;

    let primary = match args.value("--pay") {
        Some(raw) => parse_method(raw)?,
        None => PaymentMethod::Cash,
    };
    let secondary = args
        .value("--split")
        .map(|raw| -> Result<(PaymentMethod, i64)> {
            let (method, amount) = raw
                .split_once(':')
                .ok_or_else(|| anyhow!("--split expects METHOD:AMOUNT, got {raw:?}"))?;
            Ok((parse_method(method)?, parse_amount(amount, "--split")?))
        })
        .transpose()?;
    let cash_received = match args.value("--cash") {
        Some(raw) => parse_amount(raw, "--cash")?,
        None => 0,
    };

    Ok(CheckoutRequest {
        lines,
        quantity_edits,
        voucher: args.text("--voucher"),
        payment: Payment {
            primary,
            cash_received,
            secondary,
        },
    })
}

/// `NAME:QTY:PRICE`; the name may itself contain colons.
fn parse_cart_line(index: usize, raw: &str) -> Result<CartLine> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(price), Some(qty), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("--item expects NAME:QTY:PRICE, got {raw:?}");
    };
    if name.trim().is_empty() {
        bail!("--item {raw:?} has no product name");
    }
    let qty: u32 = qty
        .trim()
        .parse()
        .with_context(|| format!("--item quantity {qty:?} is not a number"))?;
    Ok(CartLine {
        id: CartLineId::new(index as i64 + 1),
        name: name.trim().to_owned(),
        qty,
        unit_price: parse_amount(price, "--item")?,
    })
}

/// Whole dong; `.` and `,` group separators are ignored.
fn parse_amount(raw: &str, option: &str) -> Result<i64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '.' | ',' | '_'))
        .collect();
    let amount: i64 = digits
        .parse()
        .with_context(|| format!("{option} amount {raw:?} is not a whole number"))?;
    if amount < 0 {
        bail!("{option} amount {raw:?} cannot be negative");
    }
    Ok(amount)
}

fn parse_method(raw: &str) -> Result<PaymentMethod> {
    PaymentMethod::parse(raw)
        .ok_or_else(|| anyhow!("unknown payment method {raw:?}; use cash, card, qr or bank"))
}
