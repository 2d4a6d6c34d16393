// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod commands;
mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use commands::Command;
use config::Config;
use runtime::Runtime;
use shopdesk_api::{Client, user_message};
use std::env;
use std::io;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{}", user_message(&error));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    if options.command.is_empty() {
        print_help();
        return Ok(());
    }
    let command = Command::parse(&options.command)?;

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `shopdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(&config.log_filter())?;

    let sessions = config.session_store()?;
    let client = Client::new(&config.api_base_url(), config.api_timeout()?)
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?
        .with_token(sessions.access_token()?);

    let stdout = io::stdout();
    let mut runtime = Runtime::new(
        client,
        sessions,
        config.page_size(),
        config.export_dir(),
        stdout.lock(),
    );
    runtime.execute(command)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    show_help: bool,
    /// Everything from the first command word on.
    command: Vec<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        show_help: false,
        command: Vec::new(),
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown if unknown.starts_with('-') => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
            word => {
                options.command.push(word.to_owned());
                options
                    .command
                    .extend(iter.by_ref().map(|rest| rest.as_ref().to_owned()));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("shopdesk: phone shop back office");
    println!();
    println!("usage: shopdesk [--config <path>] <command> [options]");
    println!();
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --help                   Show this help");
    println!();
    println!("account:");
    println!("  login --username <name> --password <pw>");
    println!("  register --name <n> --email <e> --phone <p> --password <pw> --confirm <pw> --agree-terms");
    println!("  logout | whoami");
    println!();
    println!("lists (customers, products, tickets):");
    println!("  <group> list [--search <text>] [--sort <key>] [--asc|--desc] [--page <n>] [--size <n>]");
    println!("  <group> export [list options] [--dated]");
    println!("  customers list --tier REGULAR|VIP|POTENTIAL");
    println!("  products list [--active|--inactive] [--brand <id>] [--category <name>]");
    println!("  tickets list [--status <status>] [--from YYYY-MM-DD] [--to YYYY-MM-DD]");
    println!();
    println!("customers:");
    println!("  show|deactivate|activate <id>   bulk-deactivate <id>...   stats");
    println!("  create|update [<id>] --name --phone --email --birthday --gender --address --note --tier");
    println!();
    println!("products:");
    println!("  show|activate|deactivate|delete <id>   import <file.csv>");
    println!("  create|update [<id>] --brand <id> --name --category --warranty <months> --description [--active|--inactive]");
    println!();
    println!("tickets:");
    println!("  show|delete|done <id>   status <id> <status>   technicians");
    println!("  create|update [<id>] --customer-id --customer --phone --brand --model --imei --issue");
    println!("                       --technician <id> --status --due --parts --labor --notes");
    println!();
    println!("other:");
    println!("  warranty --imei <imei> | --phone <phone>");
    println!("  checkout --item NAME:QTY:PRICE... [--qty LINE:QTY] [--voucher CODE]");
    println!("           [--pay cash|card|qr|bank] [--cash <amount>] [--split METHOD:AMOUNT]");
    println!("  dashboard");
}
