//! Warehouse configuration loaded from an INI-style `dwh.cfg` file.
//!
//! The file carries the cluster endpoint and credentials, the IAM role used by
//! `COPY`, and the S3 locations of the two source datasets:
//!
//! ```text
//! [CLUSTER]
//! HOST=dwhcluster.abc123.us-west-2.redshift.amazonaws.com
//! DB_NAME=dwh
//! DB_USER=dwhuser
//! DB_PASSWORD=Passw0rd
//! DB_PORT=5439
//!
//! [IAM_ROLE]
//! ARN='arn:aws:iam::123456789012:role/dwhRole'
//!
//! [S3]
//! LOG_DATA='s3://udacity-dend/log_data'
//! LOG_JSONPATH='s3://udacity-dend/log_json_path.json'
//! SONG_DATA='s3://udacity-dend/song_data'
//! ```
//!
//! Section and key lookups ignore case. Values may be wrapped in single or
//! double quotes; the quotes are stripped here and re-applied by the `COPY`
//! builder.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ini::{Ini, ParseOption, Properties};
use serde::Serialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{DwhError, DwhResult};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dwh.cfg";

/// Fully resolved configuration shared by the schema manager and the load runner.
#[derive(Debug, Clone)]
pub struct DwhConfig {
    /// Cluster endpoint and credentials
    pub cluster: ClusterConfig,
    /// Role assumed by the warehouse when reading from S3
    pub iam_role: IamRoleConfig,
    /// Source dataset locations
    pub s3: S3Config,
    /// Load behaviour
    pub etl: EtlConfig,
}

/// `[CLUSTER]` section.
#[derive(Clone)]
pub struct ClusterConfig {
    /// Cluster endpoint host name
    pub host: String,
    /// Database name
    pub db_name: String,
    /// Database user
    pub db_user: String,
    /// Database password
    pub db_password: String,
    /// Port, 5439 for a stock Redshift cluster
    pub db_port: u16,
}

/// `[IAM_ROLE]` section.
#[derive(Debug, Clone)]
pub struct IamRoleConfig {
    /// ARN of the role passed to `COPY ... IAM_ROLE`
    pub arn: String,
}

/// `[S3]` section.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Prefix holding newline-delimited JSON event logs
    pub log_data: String,
    /// JSONPaths file mapping event log fields to `staging_events` columns
    pub log_jsonpath: String,
    /// Prefix holding song catalog JSON records
    pub song_data: String,
}

/// Optional `[ETL]` section.
#[derive(Debug, Clone, Default)]
pub struct EtlConfig {
    /// How the load runner commits its statements
    pub commit_mode: CommitMode,
}

/// Commit discipline for the load runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Every statement commits on its own (autocommit)
    #[default]
    PerStatement,
    /// All load statements run inside one transaction
    Single,
}

impl FromStr for CommitMode {
    type Err = DwhError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per_statement" | "per-statement" => Ok(Self::PerStatement),
            "single" | "transaction" => Ok(Self::Single),
            other => Err(DwhError::config(format!(
                "unknown COMMIT_MODE '{other}' (expected per_statement or single)"
            ))),
        }
    }
}

impl DwhConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> DwhResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|err| match err {
            DwhError::ConfigParse { message, .. } => DwhError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from an in-memory string.
    pub fn parse(contents: &str) -> DwhResult<Self> {
        // Escapes stay disabled so backslashes reach the COPY builder, which rejects them.
        let option = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(contents, option).map_err(|err| DwhError::ConfigParse {
            path: DEFAULT_CONFIG_FILE.into(),
            message: err.to_string(),
        })?;

        let cluster = section(&ini, "CLUSTER")?;
        let port = required(cluster, "CLUSTER", "DB_PORT")?;
        let cluster = ClusterConfig {
            host: required(cluster, "CLUSTER", "HOST")?,
            db_name: required(cluster, "CLUSTER", "DB_NAME")?,
            db_user: required(cluster, "CLUSTER", "DB_USER")?,
            db_password: required(cluster, "CLUSTER", "DB_PASSWORD")?,
            db_port: port
                .parse()
                .map_err(|_| DwhError::config(format!("[CLUSTER] DB_PORT '{port}' is not a port")))?,
        };

        let iam = section(&ini, "IAM_ROLE")?;
        let iam_role = IamRoleConfig {
            arn: required(iam, "IAM_ROLE", "ARN")?,
        };

        let s3 = section(&ini, "S3")?;
        let s3 = S3Config {
            log_data: required(s3, "S3", "LOG_DATA")?,
            log_jsonpath: required(s3, "S3", "LOG_JSONPATH")?,
            song_data: required(s3, "S3", "SONG_DATA")?,
        };

        let etl = match find_section(&ini, "ETL") {
            Some(props) => EtlConfig {
                commit_mode: match lookup(props, "COMMIT_MODE") {
                    Some(value) => value.parse()?,
                    None => CommitMode::default(),
                },
            },
            None => EtlConfig::default(),
        };

        Ok(Self {
            cluster,
            iam_role,
            s3,
            etl,
        })
    }
}

impl ClusterConfig {
    /// Connection options for a single warehouse session.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }

    /// `host:port/database`, safe to log.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.db_port, self.db_name)
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_port", &self.db_port)
            .finish()
    }
}

fn find_section<'a>(ini: &'a Ini, name: &str) -> Option<&'a Properties> {
    ini.iter()
        .find(|(section, _)| section.is_some_and(|s| s.eq_ignore_ascii_case(name)))
        .map(|(_, props)| props)
}

fn section<'a>(ini: &'a Ini, name: &str) -> DwhResult<&'a Properties> {
    find_section(ini, name).ok_or_else(|| DwhError::config(format!("missing [{name}] section")))
}

fn lookup(props: &Properties, key: &str) -> Option<String> {
    props
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| unquote(v).to_string())
}

fn required(props: &Properties, section: &str, key: &str) -> DwhResult<String> {
    match lookup(props, key) {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(DwhError::config(format!("[{section}] {key} is empty"))),
        None => Err(DwhError::config(format!("missing [{section}] {key}"))),
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
