// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber. Stdout stays reserved for command output.
pub fn init(filter: &str) -> Result<()> {
    let filter = build_filter(filter)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(io::stderr),
        )
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn build_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter.trim()).with_context(|| {
        format!("invalid log filter {filter:?} -- use a level such as warn or a RUST_LOG-style directive")
    })
}

#[cfg(test)]
mod tests {
    use super::build_filter;

    #[test]
    fn level_and_directive_filters_parse() {
        assert!(build_filter("warn").is_ok());
        assert!(build_filter("shopdesk_api=debug,info").is_ok());
    }

    #[test]
    fn garbage_filter_is_rejected() {
        let error = build_filter("shopdesk_api=loud").expect_err("bad level");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
