//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POSTS_DIR: &str = "posts";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SITE_TITLE: &str = "Carlos Cervantes";
const DEFAULT_SITE_AUTHOR: &str = "Carlos Cervantes";
const DEFAULT_GITHUB_USER: &str = "CarlosCerv";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_PROJECT_LIMIT: u64 = 6;

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Personal portfolio and blog server",
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FOLIO_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    /// Serve flags accepted without naming the `serve` subcommand.
    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl CliArgs {
    /// The subcommand to run; a bare invocation serves.
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(Box::new(self.serve.clone())))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(Box<ServeArgs>),
    /// Copy markdown posts from the posts directory into Postgres.
    #[command(name = "migrate-posts")]
    MigratePosts(MigratePostsArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the admin password.
    #[arg(
        long = "admin-password",
        env = "ADMIN_PASSWORD",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub admin_password: Option<String>,

    /// Select the post storage backend.
    #[arg(long = "storage-backend", value_name = "BACKEND", value_enum)]
    pub storage_backend: Option<StorageBackend>,

    /// Override the directory holding markdown posts.
    #[arg(long = "posts-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub posts_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the GitHub account listed on the projects page.
    #[arg(long = "github-user", value_name = "USER")]
    pub github_user: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigratePostsArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Directory to read markdown posts from.
    #[arg(long = "posts-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub posts_dir: Option<PathBuf>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub admin: AdminSettings,
    pub site: SiteSettings,
    pub storage: StorageSettings,
    pub projects: ProjectsSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Clone)]
pub struct AdminSettings {
    pub password: Option<String>,
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Files,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub posts_dir: PathBuf,
    pub database_url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct ProjectsSettings {
    pub github_user: String,
    pub limit: usize,
    pub token: Option<String>,
    pub api_base: Url,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    let command = cli.resolved_command();
    match &command {
        Command::Serve(args) => raw.apply_serve_overrides(&args.overrides),
        Command::MigratePosts(args) => raw.apply_migrate_overrides(args),
    }

    let settings = Settings::from_raw(raw)?;
    match command {
        Command::Serve(_) => settings.require_admin_password()?,
        Command::MigratePosts(_) => settings.require_database_url()?,
    }
    Ok(settings)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    admin: RawAdminSettings,
    site: RawSiteSettings,
    storage: RawStorageSettings,
    projects: RawProjectsSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(password) = overrides.admin_password.as_ref() {
            self.admin.password = Some(password.clone());
        }
        if let Some(backend) = overrides.storage_backend {
            self.storage.backend = Some(backend);
        }
        if let Some(dir) = overrides.posts_dir.as_ref() {
            self.storage.posts_dir = Some(dir.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(user) = overrides.github_user.as_ref() {
            self.projects.github_user = Some(user.clone());
        }
        self.apply_database_override(&overrides.database);
    }

    fn apply_migrate_overrides(&mut self, args: &MigratePostsArgs) {
        if let Some(dir) = args.posts_dir.as_ref() {
            self.storage.posts_dir = Some(dir.clone());
        }
        self.apply_database_override(&args.database);
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.storage.database_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            admin,
            site,
            storage,
            projects,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            admin: build_admin_settings(admin),
            site: build_site_settings(site),
            storage: build_storage_settings(storage)?,
            projects: build_projects_settings(projects)?,
        })
    }

    fn require_admin_password(&self) -> Result<(), LoadError> {
        match self.admin.password.as_deref() {
            Some(_) => Ok(()),
            None => Err(LoadError::invalid(
                "admin.password",
                "an admin password is required (set ADMIN_PASSWORD or FOLIO__ADMIN__PASSWORD)",
            )),
        }
    }

    fn require_database_url(&self) -> Result<(), LoadError> {
        match self.storage.database_url.as_deref() {
            Some(_) => Ok(()),
            None => Err(LoadError::invalid(
                "storage.database_url",
                "a database url is required to migrate posts",
            )),
        }
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;
    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_admin_settings(admin: RawAdminSettings) -> AdminSettings {
    AdminSettings {
        password: non_blank(admin.password),
    }
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        title: non_blank(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        author: non_blank(site.author).unwrap_or_else(|| DEFAULT_SITE_AUTHOR.to_string()),
    }
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let backend = storage.backend.unwrap_or(StorageBackend::Files);
    let database_url = non_blank(storage.database_url);
    if backend == StorageBackend::Postgres && database_url.is_none() {
        return Err(LoadError::invalid(
            "storage.database_url",
            "required when storage.backend is `postgres`",
        ));
    }

    let max_connections = non_zero_u32(
        u64::from(
            storage
                .max_connections
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        ),
        "storage.max_connections",
    )?;

    Ok(StorageSettings {
        backend,
        posts_dir: storage
            .posts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POSTS_DIR)),
        database_url,
        max_connections,
    })
}

fn build_projects_settings(projects: RawProjectsSettings) -> Result<ProjectsSettings, LoadError> {
    let limit = projects.limit.unwrap_or(DEFAULT_PROJECT_LIMIT);
    let limit = usize::try_from(non_zero_u32(limit, "projects.limit")?.get())
        .map_err(|_| LoadError::invalid("projects.limit", "value exceeds supported range"))?;

    let api_base = non_blank(projects.api_base).unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.into());
    let api_base = Url::parse(&api_base)
        .map_err(|err| LoadError::invalid("projects.api_base", format!("invalid url: {err}")))?;

    Ok(ProjectsSettings {
        github_user: non_blank(projects.github_user)
            .unwrap_or_else(|| DEFAULT_GITHUB_USER.to_string()),
        limit,
        token: non_blank(projects.token),
        api_base,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawAdminSettings {
    password: Option<String>,
}

impl std::fmt::Debug for RawAdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawAdminSettings").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    backend: Option<StorageBackend>,
    posts_dir: Option<PathBuf>,
    database_url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawProjectsSettings {
    github_user: Option<String>,
    limit: Option<u64>,
    token: Option<String>,
    api_base: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_without_any_source() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
        assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
        assert_eq!(settings.storage.backend, StorageBackend::Files);
        assert_eq!(settings.storage.posts_dir, PathBuf::from(DEFAULT_POSTS_DIR));
        assert_eq!(settings.projects.limit, 6);
        assert!(settings.admin.password.is_none());
        assert!(settings.require_admin_password().is_err());
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(4000);
        raw.logging.level = Some("info".to_string());
        raw.admin.password = Some("from-file".to_string());

        let overrides = ServeOverrides {
            port: Some(4321),
            log_level: Some("debug".to_string()),
            admin_password: Some("from-cli".to_string()),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert_eq!(settings.admin.password.as_deref(), Some("from-cli"));
    }

    #[test]
    fn blank_admin_password_counts_as_missing() {
        let mut raw = RawSettings::default();
        raw.admin.password = Some("   ".to_string());
        let settings = Settings::from_raw(raw).expect("valid settings");
        assert!(matches!(
            settings.require_admin_password(),
            Err(LoadError::Invalid {
                key: "admin.password",
                ..
            })
        ));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let mut raw = RawSettings::default();
        raw.storage.backend = Some(StorageBackend::Postgres);
        assert!(matches!(
            Settings::from_raw(raw.clone()),
            Err(LoadError::Invalid {
                key: "storage.database_url",
                ..
            })
        ));

        raw.storage.database_url = Some("postgres://localhost/folio".to_string());
        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
    }

    #[test]
    fn zero_port_and_limit_are_rejected() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(0);
        assert!(Settings::from_raw(raw).is_err());

        let mut raw = RawSettings::default();
        raw.projects.limit = Some(0);
        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid {
                key: "projects.limit",
                ..
            })
        ));
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = RawSettings::default();
        let overrides = ServeOverrides {
            log_json: Some(true),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn default_to_serve_command() {
        let args = CliArgs::parse_from(["folio", "--github-user", "someone"]);
        match args.resolved_command() {
            Command::Serve(serve) => {
                assert_eq!(serve.overrides.github_user.as_deref(), Some("someone"));
            }
            _ => panic!("wrong command resolved"),
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let args = CliArgs::parse_from([
            "folio",
            "serve",
            "--server-host",
            "0.0.0.0",
            "--storage-backend",
            "postgres",
            "--database-url",
            "postgres://override",
        ]);

        match args.command.expect("serve command") {
            Command::Serve(serve) => {
                assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
                assert_eq!(
                    serve.overrides.storage_backend,
                    Some(StorageBackend::Postgres)
                );
                assert_eq!(
                    serve.overrides.database.database_url.as_deref(),
                    Some("postgres://override")
                );
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_migrate_posts_arguments() {
        let args = CliArgs::parse_from([
            "folio",
            "migrate-posts",
            "--posts-dir",
            "/srv/posts",
            "--database-url",
            "postgres://example",
        ]);

        match args.command.expect("migrate command") {
            Command::MigratePosts(migrate) => {
                assert_eq!(
                    migrate.posts_dir.as_deref(),
                    Some(std::path::Path::new("/srv/posts"))
                );
                assert_eq!(
                    migrate.database.database_url.as_deref(),
                    Some("postgres://example")
                );
            }
            _ => panic!("wrong command parsed"),
        }

        let mut raw = RawSettings::default();
        if let Some(Command::MigratePosts(migrate)) =
            CliArgs::parse_from(["folio", "migrate-posts", "--posts-dir", "/srv/posts"]).command
        {
            raw.apply_migrate_overrides(&migrate);
        }
        assert_eq!(raw.storage.posts_dir, Some(PathBuf::from("/srv/posts")));
    }
}
