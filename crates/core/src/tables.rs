//! Table catalog for the staging tables and the songplay star schema.
//!
//! Table and column names are consumed by downstream queries and must not
//! change. Primary keys are informational in Redshift; the insert statements
//! keep dimension keys unique by picking one row per key. Foreign keys from
//! `songplays` to the dimensions are not declared.

/// Warehouse column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `VARCHAR(max)`
    Text,
    /// `VARCHAR(n)`
    Varchar(u16),
    /// `CHAR(n)`
    Char(u8),
    /// `INT`
    Int,
    /// `INT4`
    Int4,
    /// `BIGINT`
    BigInt,
    /// `DOUBLE PRECISION`
    Double,
    /// `TIMESTAMP`
    Timestamp,
    /// `INT IDENTITY(0,1)`, a synthetic surrogate key
    Identity,
}

impl ColumnType {
    /// SQL spelling of the type.
    pub fn sql(self) -> String {
        match self {
            Self::Text => "VARCHAR(max)".to_string(),
            Self::Varchar(len) => format!("VARCHAR({len})"),
            Self::Char(len) => format!("CHAR({len})"),
            Self::Int => "INT".to_string(),
            Self::Int4 => "INT4".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::Double => "DOUBLE PRECISION".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            Self::Identity => "INT IDENTITY(0,1)".to_string(),
        }
    }
}

/// Column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Column type
    pub ty: ColumnType,
    /// Declared `NOT NULL`
    pub not_null: bool,
    /// Declared `PRIMARY KEY`
    pub primary_key: bool,
}

impl Column {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            not_null: false,
            primary_key: false,
        }
    }

    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn sql(&self) -> String {
        let mut out = format!("{} {}", self.name, self.ty.sql());
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        out
    }
}

/// Role a table plays in the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Raw landing table, overwritten by each `COPY`
    Staging,
    /// Deduplicated reference table
    Dimension,
    /// One row per playback event
    Fact,
}

/// Table declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: &'static str,
    /// Staging, dimension or fact
    pub kind: TableKind,
    /// Columns in declaration order
    pub columns: &'static [Column],
    /// Redshift distribution key
    pub dist_key: Option<&'static str>,
    /// Redshift compound sort key
    pub sort_key: &'static [&'static str],
}

impl TableDef {
    /// `DROP TABLE IF EXISTS` statement.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("    {}", column.sql()))
            .collect();
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.name,
            columns.join(",\n")
        );
        if let Some(key) = self.dist_key {
            sql.push_str(&format!("\nDISTKEY({key})"));
        }
        if !self.sort_key.is_empty() {
            sql.push_str(&format!("\nSORTKEY({})", self.sort_key.join(", ")));
        }
        sql
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// The primary key column, if one is declared.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.primary_key)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

use ColumnType::{BigInt, Char, Double, Identity, Int, Int4, Text, Timestamp, Varchar};

/// Raw event log records, one row per user action.
pub const STAGING_EVENTS: TableDef = TableDef {
    name: "staging_events",
    kind: TableKind::Staging,
    columns: &[
        Column::new("event_id", Identity).primary_key(),
        Column::new("artist", Text),
        Column::new("auth", Text),
        Column::new("firstName", Text),
        Column::new("gender", Char(1)),
        Column::new("itemInSession", Int),
        Column::new("lastName", Text),
        Column::new("length", Double),
        Column::new("level", Text),
        Column::new("location", Text),
        Column::new("method", Text),
        Column::new("page", Varchar(300)),
        Column::new("registration", Double),
        Column::new("sessionId", Int),
        Column::new("song", Text),
        Column::new("status", Int),
        Column::new("ts", BigInt),
        Column::new("userAgent", Text),
        Column::new("userId", Text),
    ],
    dist_key: None,
    sort_key: &[],
};

/// Raw song catalog records.
pub const STAGING_SONGS: TableDef = TableDef {
    name: "staging_songs",
    kind: TableKind::Staging,
    columns: &[
        Column::new("artist_id", Text),
        Column::new("artist_latitude", Double),
        Column::new("artist_location", Text),
        Column::new("artist_longitude", Double),
        Column::new("artist_name", Text),
        Column::new("duration", Double),
        Column::new("num_songs", Int),
        Column::new("song_id", Text),
        Column::new("title", Text),
        Column::new("year", Int4),
    ],
    dist_key: None,
    sort_key: &[],
};

/// Fact table: one row per song played.
pub const SONGPLAYS: TableDef = TableDef {
    name: "songplays",
    kind: TableKind::Fact,
    columns: &[
        Column::new("songplay_id", Identity).primary_key(),
        Column::new("start_time", Timestamp),
        Column::new("user_id", Text).not_null(),
        Column::new("level", Text),
        Column::new("song_id", Text).not_null(),
        Column::new("artist_id", Text).not_null(),
        Column::new("session_id", BigInt).not_null(),
        Column::new("location", Text),
        Column::new("user_agent", Text),
    ],
    dist_key: Some("song_id"),
    sort_key: &["start_time", "session_id"],
};

/// Users seen playing songs.
pub const USERS: TableDef = TableDef {
    name: "users",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("user_id", Text).primary_key(),
        Column::new("first_name", Text),
        Column::new("last_name", Text),
        Column::new("gender", Char(1)),
        Column::new("level", Text).not_null(),
    ],
    dist_key: None,
    sort_key: &[],
};

/// Songs in the catalog.
pub const SONGS: TableDef = TableDef {
    name: "songs",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("song_id", Text).primary_key(),
        Column::new("title", Text),
        Column::new("artist_id", Text).not_null(),
        Column::new("year", Int4),
        Column::new("duration", Double),
    ],
    dist_key: Some("artist_id"),
    sort_key: &["song_id", "year"],
};

/// Artists in the catalog.
pub const ARTISTS: TableDef = TableDef {
    name: "artists",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("artist_id", Text).primary_key(),
        Column::new("name", Text),
        Column::new("location", Text),
        Column::new("latitude", Double),
        Column::new("longitude", Double),
    ],
    dist_key: None,
    sort_key: &[],
};

/// Calendar breakdown of every songplay start time.
pub const TIME: TableDef = TableDef {
    name: "time",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("start_time", Timestamp).primary_key(),
        Column::new("hour", Int),
        Column::new("day", Int),
        Column::new("week", Int),
        Column::new("month", Int),
        Column::new("year", Int4),
        Column::new("weekday", Int),
    ],
    dist_key: None,
    sort_key: &[],
};

/// Order in which tables are dropped.
pub const DROP_ORDER: [&TableDef; 7] = [
    &STAGING_EVENTS,
    &STAGING_SONGS,
    &SONGPLAYS,
    &USERS,
    &SONGS,
    &ARTISTS,
    &TIME,
];

/// Order in which tables are created: staging and dimensions before the fact table.
pub const CREATE_ORDER: [&TableDef; 7] = [
    &STAGING_EVENTS,
    &STAGING_SONGS,
    &USERS,
    &SONGS,
    &ARTISTS,
    &TIME,
    &SONGPLAYS,
];
