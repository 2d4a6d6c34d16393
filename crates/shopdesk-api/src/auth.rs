// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::Method;
use serde_json::Value;
use shopdesk_app::AuthResponse;
use shopdesk_app::forms::{LoginInput, RegisterInput};

use crate::{Client, Session, decode_data};

impl Client {
    /// Logs in and returns the session to persist. The client keeps the new
    /// token for follow-up calls.
    pub fn login(&mut self, input: &LoginInput) -> Result<Session> {
        input.validate()?;
        let payload = input.payload();
        let body = self
            .send_value(Method::POST, &["api", "auth", "login"], Some(&payload))
            .context("log in")?;
        let response: AuthResponse = decode_data(&body, "login response")?;
        let Some(session) = Session::from_auth(&response, &payload.username)? else {
            bail!("login response carried no access token -- check the backend auth settings");
        };
        self.set_token(Some(session.access_token.clone()));
        Ok(session)
    }

    pub fn register(&self, input: &RegisterInput) -> Result<Value> {
        input.validate()?;
        let body = self
            .send_value(Method::POST, &["api", "auth", "register"], Some(&input.payload()))
            .context("register account")?;
        Ok(body)
    }
}
