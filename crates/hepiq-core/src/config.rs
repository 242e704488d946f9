use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{ChatId, Department},
    errors::Error,
    Result,
};

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_path: PathBuf,
    pub department_admins: DepartmentAdmins,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let database_path = env_str("DATABASE_PATH")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("hepiq_support.db"));

        let department_admins = DepartmentAdmins::from_lookup(env_str);

        Ok(Self {
            telegram_bot_token,
            database_path,
            department_admins,
        })
    }
}

/// Static department -> administrator chat map.
///
/// Read-only after startup. A department without an entry cannot receive
/// tickets; administrators obtain their chat id through `/myid`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepartmentAdmins {
    by_department: HashMap<Department, ChatId>,
}

impl DepartmentAdmins {
    pub fn new(entries: impl IntoIterator<Item = (Department, ChatId)>) -> Self {
        Self {
            by_department: entries
                .into_iter()
                .filter(|(_, chat)| chat.0 != 0)
                .collect(),
        }
    }

    /// Build the map from `ADMIN_CHAT_ID_<CODE>` keys resolved by `lookup`.
    /// Missing, blank, unparsable or zero values leave the department unconfigured.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(Department::ALL.into_iter().filter_map(|dept| {
            let raw = lookup(&Self::env_key(dept))?;
            let id = raw.trim().parse::<i64>().ok()?;
            Some((dept, ChatId(id)))
        }))
    }

    pub fn env_key(dept: Department) -> String {
        format!("ADMIN_CHAT_ID_{}", dept.code())
    }

    pub fn admin_for(&self, dept: Department) -> Option<ChatId> {
        self.by_department.get(&dept).copied()
    }

    pub fn is_admin(&self, chat_id: ChatId) -> bool {
        chat_id.0 != 0 && self.by_department.values().any(|c| *c == chat_id)
    }

    pub fn unconfigured(&self) -> Vec<Department> {
        Department::ALL
            .into_iter()
            .filter(|d| !self.by_department.contains_key(d))
            .collect()
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
