//! Configuration management for sqlserver-executor.
//!
//! Handles locating and loading the JSON configuration document, selecting a
//! named connection profile, and layering command-line overrides on top.

use crate::error::{ConnectionField, ExecutorError, Result};
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Profile name used when the document declares no default, and for the
/// implicit profile of a legacy flat document.
pub const DEFAULT_PROFILE_NAME: &str = "default";

const APP_DIR: &str = "sqlserver-executor";

/// Connection fields as they appear in a profile entry, the legacy root of
/// the document, or on the command line. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialProfile {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
}

/// Accepts a port written either as a JSON number or as a numeric string.
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match Option::<RawPort>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPort::Number(port)) => Ok(Some(port)),
        Some(RawPort::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawPort::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| <D::Error as de::Error>::custom(format!("invalid port \"{text}\""))),
    }
}

impl PartialProfile {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        field(&self.server).is_none()
            && field(&self.database).is_none()
            && field(&self.user).is_none()
            && field(&self.password).is_none()
            && self.port.is_none()
    }
}

/// Treats empty strings the same as absent values.
fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A fully resolved connection profile.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub name: String,
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl ConnectionProfile {
    /// Returns a display-safe string (no credentials) for logs.
    pub fn display_string(&self) -> String {
        format!("{} @ {}:{}", self.database, self.server, self.port)
    }
}

impl std::fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .finish()
    }
}

/// The parsed configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    /// Name of the profile used when none is requested.
    #[serde(default, rename = "default")]
    pub default_profile: Option<String>,

    /// Named connection profiles, in document order.
    #[serde(default)]
    pub connections: IndexMap<String, PartialProfile>,

    /// Root-level connection fields of the legacy flat form.
    #[serde(flatten)]
    pub legacy: PartialProfile,
}

impl ConfigDocument {
    /// Parses a document from JSON text. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            ExecutorError::config(format!(
                "配置文件格式错误 {}: {}",
                origin.display(),
                e
            ))
        })
    }

    /// Reads and parses a document from disk.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExecutorError::config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::parse(&content, path)
    }

    /// Name of the default profile as declared by the document.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile
            .as_deref()
            .unwrap_or(DEFAULT_PROFILE_NAME)
    }

    /// Returns true if the document has no `connections` mapping.
    pub fn is_legacy(&self) -> bool {
        self.connections.is_empty()
    }

    /// Profiles in document order. A legacy document yields its root fields
    /// as a single implicit profile.
    pub fn profiles(&self) -> Vec<(&str, &PartialProfile)> {
        if !self.is_legacy() {
            return self
                .connections
                .iter()
                .map(|(name, profile)| (name.as_str(), profile))
                .collect();
        }
        if self.legacy.is_empty() {
            Vec::new()
        } else {
            vec![(DEFAULT_PROFILE_NAME, &self.legacy)]
        }
    }

    /// Selects a profile: the requested name, then the declared default,
    /// then the first profile. A requested name that does not exist adds a
    /// warning and falls through. A legacy document ignores the name.
    pub fn select_profile(
        &self,
        requested: Option<&str>,
        warnings: &mut Vec<String>,
    ) -> Option<(&str, &PartialProfile)> {
        if self.is_legacy() {
            return self.profiles().first().copied();
        }

        let profiles = self.profiles();
        let by_name = |name: &str| profiles.iter().copied().find(|(n, _)| *n == name);

        if let Some(name) = requested {
            if let Some(hit) = by_name(name) {
                return Some(hit);
            }
            warnings.push(format!("配置 '{name}' 不存在，使用默认配置"));
        }

        by_name(self.default_profile_name()).or_else(|| profiles.first().copied())
    }

    /// Renders the `--list-profiles` listing.
    ///
    /// Only named profiles are listed; a legacy document has none.
    pub fn render_profile_list(&self) -> String {
        if self.connections.is_empty() {
            return "未找到任何数据库配置".to_string();
        }

        let default_name = self.default_profile_name();
        let mut out = String::from("可用的数据库配置:\n");
        out.push_str(&"-".repeat(50));
        out.push('\n');
        for (name, profile) in &self.connections {
            let mark = if name == default_name { " (默认)" } else { "" };
            let _ = writeln!(out, "  {name}{mark}");
            let _ = writeln!(out, "    服务器: {}", field(&profile.server).unwrap_or("未配置"));
            let _ = writeln!(out, "    数据库: {}", field(&profile.database).unwrap_or("未配置"));
            out.push('\n');
        }
        out
    }
}

/// Ordered list of places to look for a configuration file.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    candidates: Vec<PathBuf>,
}

impl Default for ConfigLocator {
    fn default() -> Self {
        Self::new(Self::default_candidates())
    }
}

impl ConfigLocator {
    /// Creates a locator over an explicit candidate list.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// The standard search order: next to the installed tool, the home
    /// dotfile, the user config directory, then the working directory.
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(4);

        if let Some(skill_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
        {
            candidates.push(skill_dir.join("config.json"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".sqlserver-executor.json"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(APP_DIR).join("config.json"));
        }
        candidates.push(PathBuf::from("./sqlserver-config.json"));

        candidates
    }

    /// Finds the configuration file to load.
    ///
    /// An explicit path must exist. Without one, the first existing
    /// candidate wins; `Ok(None)` means nothing was found.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return if path.exists() {
                Ok(Some(path.to_path_buf()))
            } else {
                Err(ExecutorError::ConfigNotFound(path.to_path_buf()))
            };
        }

        Ok(self.candidates.iter().find(|p| p.is_file()).cloned())
    }
}

/// Loads configuration documents and resolves connection profiles.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    locator: ConfigLocator,
}

impl ConfigResolver {
    pub fn new(locator: ConfigLocator) -> Self {
        Self { locator }
    }

    /// Loads the configuration document.
    ///
    /// A missing explicit file is reported as a warning and yields an empty
    /// document; a malformed one is an error.
    pub fn load(&self, explicit: Option<&Path>) -> Result<(ConfigDocument, Vec<String>)> {
        let mut warnings = Vec::new();

        let path = match self.locator.locate(explicit) {
            Ok(path) => path,
            Err(e @ ExecutorError::ConfigNotFound(_)) => {
                warnings.push(e.to_string());
                None
            }
            Err(e) => return Err(e),
        };

        let document = match path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                ConfigDocument::load_from_file(&path)?
            }
            None => {
                debug!("No config file found, continuing with an empty configuration");
                ConfigDocument::default()
            }
        };

        Ok((document, warnings))
    }

    /// Loads the document and resolves a profile in one step.
    pub fn resolve(
        &self,
        explicit: Option<&Path>,
        profile_name: Option<&str>,
        overrides: &PartialProfile,
    ) -> Result<(ConnectionProfile, Vec<String>)> {
        let (document, mut warnings) = self.load(explicit)?;
        let (profile, more) = resolve_profile(&document, profile_name, overrides)?;
        warnings.extend(more);
        Ok((profile, warnings))
    }
}

/// Resolves the effective connection profile from a loaded document.
///
/// Precedence per field: override, then the selected profile, then the
/// built-in default (port only). Every missing mandatory field is reported.
pub fn resolve_profile(
    document: &ConfigDocument,
    profile_name: Option<&str>,
    overrides: &PartialProfile,
) -> Result<(ConnectionProfile, Vec<String>)> {
    let mut warnings = Vec::new();
    let empty = PartialProfile::default();
    let (name, selected) = document
        .select_profile(profile_name, &mut warnings)
        .unwrap_or((DEFAULT_PROFILE_NAME, &empty));

    let pick = |over: &Option<String>, base: &Option<String>| {
        field(over).or(field(base)).map(str::to_string)
    };
    let server = pick(&overrides.server, &selected.server);
    let database = pick(&overrides.database, &selected.database);
    let user = pick(&overrides.user, &selected.user);
    let password = pick(&overrides.password, &selected.password);
    let port = overrides.port.or(selected.port).unwrap_or(DEFAULT_PORT);

    let missing: Vec<ConnectionField> = [
        (ConnectionField::Server, server.is_none()),
        (ConnectionField::Database, database.is_none()),
        (ConnectionField::User, user.is_none()),
        (ConnectionField::Password, password.is_none()),
    ]
    .into_iter()
    .filter_map(|(f, absent)| absent.then_some(f))
    .collect();

    match (server, database, user, password) {
        (Some(server), Some(database), Some(user), Some(password)) => Ok((
            ConnectionProfile {
                name: name.to_string(),
                server,
                database,
                user,
                password,
                port,
            },
            warnings,
        )),
        _ => Err(ExecutorError::ConfigIncomplete(missing)),
    }
}
