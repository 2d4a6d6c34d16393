// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use shopdesk_app::AuthResponse;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub saved_at: String,
}

impl Session {
    /// `None` when the login response carried no access token.
    pub fn from_auth(response: &AuthResponse, fallback_username: &str) -> Result<Option<Self>> {
        let Some(access_token) = response
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        else {
            return Ok(None);
        };
        let saved_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("format session timestamp")?;
        Ok(Some(Self {
            access_token: access_token.to_owned(),
            refresh_token: response.refresh_token.clone(),
            username: response
                .username
                .clone()
                .or_else(|| Some(fallback_username.to_owned()).filter(|name| !name.is_empty())),
            role: response.role.clone(),
            saved_at,
        }))
    }
}

/// Token persistence in a single JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| anyhow!("resolve data directory -- set session.path in the config"))?;
        Ok(base.join("shopdesk").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("read session file {}", self.path.display()));
            }
        };
        let session = serde_json::from_str(&raw).with_context(|| {
            format!(
                "parse session file {} -- run `shopdesk logout` and log in again",
                self.path.display()
            )
        })?;
        Ok(Some(session))
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|session| session.access_token))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create session directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session).context("encode session")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write session file {}", self.path.display()))
    }

    /// Returns whether a session existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => {
                Err(error).with_context(|| format!("remove session file {}", self.path.display()))
            }
        }
    }
}
