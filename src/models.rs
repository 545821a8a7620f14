use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

pub const DEFAULT_BASE_URL: &str = "http://sport-plus.sorewa.ru:8080/v1";

/// Length of every generated calendar entry, in hours.
pub const ENTRY_HOURS: i64 = 1;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            users: vec![
                User {
                    login: "coach_acc0".into(),
                    password: "12345".into(),
                    role: Role::Coach,
                    id: Some(41),
                },
                User {
                    login: "client_calendar".into(),
                    password: "client_calendar".into(),
                    role: Role::Client,
                    id: Some(40),
                },
            ],
        }
    }
}

impl Config {
    /// First configured user with the coach role.
    pub fn coach(&self) -> Result<&User> {
        self.first_with_role(Role::Coach)
    }

    /// First configured user with the client role.
    pub fn client(&self) -> Result<&User> {
        self.first_with_role(Role::Client)
    }

    fn first_with_role(&self, role: Role) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.role == role)
            .with_context(|| format!("No {} configured", role))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coach => f.write_str("coach"),
            Role::Client => f.write_str("client"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct User {
    pub login: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub id: Option<i64>,
}

/// Calendar collection served under `/calendar/{endpoint}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Global,
    Local,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Global => "global",
            Endpoint::Local => "local",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Local,
    Global,
}

/// Body of `POST /calendar`.
///
/// Built only through [`CalendarEntry::local`] and [`CalendarEntry::global`], so
/// `end_time` is always one hour after `start_time` and `is_global` always
/// agrees with `type`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CalendarEntry {
    client_id: i64,
    #[serde(serialize_with = "utc_seconds")]
    date: DateTime<Utc>,
    #[serde(serialize_with = "utc_seconds")]
    start_time: DateTime<Utc>,
    #[serde(serialize_with = "utc_seconds")]
    end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: EntryType,
    reminder_client: bool,
    reminder_coach: bool,
    is_global: bool,
}

impl CalendarEntry {
    /// Entry scoped to one client/coach pairing.
    pub fn local(client_id: i64, start: DateTime<Utc>) -> Self {
        Self::new(client_id, start, EntryType::Local)
    }

    /// Entry visible to every client, owned by the coach.
    pub fn global(coach_id: i64, start: DateTime<Utc>) -> Self {
        Self::new(coach_id, start, EntryType::Global)
    }

    fn new(client_id: i64, start: DateTime<Utc>, kind: EntryType) -> Self {
        Self {
            client_id,
            date: start,
            start_time: start,
            end_time: start + Duration::hours(ENTRY_HOURS),
            kind,
            reminder_client: true,
            reminder_coach: true,
            is_global: kind == EntryType::Global,
        }
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn kind(&self) -> EntryType {
        self.kind
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }
}

// `2024-01-09T20:30:15Z`: second precision, literal Z.
fn utc_seconds<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}
