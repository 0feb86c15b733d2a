use anyhow::Result;
use sparkdwh_core::{schema, DwhConfig, Warehouse};
use sqlx::PgConnection;

/// Loads the config named by `DWH_TEST_CONFIG`, or `None` when no cluster is available.
pub fn test_config() -> Result<Option<DwhConfig>> {
    match std::env::var("DWH_TEST_CONFIG") {
        Ok(path) => Ok(Some(DwhConfig::from_file(path)?)),
        Err(_) => Ok(None),
    }
}

/// Connects and resets the schema so every test starts from empty tables.
pub async fn fresh_warehouse(config: &DwhConfig) -> Result<Warehouse> {
    let mut warehouse = Warehouse::connect(&config.cluster).await?;
    schema::reset(&mut warehouse).await?;
    Ok(warehouse)
}

pub struct EventRow<'a> {
    pub artist: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: &'a str,
    pub length: Option<f64>,
    pub level: &'a str,
    pub location: &'a str,
    pub page: &'a str,
    pub session_id: i32,
    pub song: Option<&'a str>,
    pub ts: i64,
    pub user_agent: &'a str,
    pub user_id: &'a str,
}

impl<'a> EventRow<'a> {
    /// A `NextSong` event for user 26 on 2018-11-01 21:11:13.796 UTC.
    pub fn playback(song: &'a str, artist: &'a str, length: f64) -> Self {
        Self {
            artist: Some(artist),
            first_name: "Ryan",
            last_name: "Smith",
            gender: "M",
            length: Some(length),
            level: "free",
            location: "San Jose-Sunnyvale-Santa Clara, CA",
            page: "NextSong",
            session_id: 583,
            song: Some(song),
            ts: 1_541_106_673_796,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)",
            user_id: "26",
        }
    }

    /// A non-playback page view by user 8.
    pub fn home_page() -> Self {
        Self {
            artist: None,
            first_name: "Kaylee",
            last_name: "Summers",
            gender: "F",
            length: None,
            level: "free",
            location: "Phoenix-Mesa-Scottsdale, AZ",
            page: "Home",
            session_id: 139,
            song: None,
            ts: 1_541_106_106_796,
            user_agent: "Mozilla/5.0 (Windows NT 6.1; WOW64)",
            user_id: "8",
        }
    }
}

pub struct SongRow<'a> {
    pub artist_id: Option<&'a str>,
    pub artist_name: &'a str,
    pub duration: f64,
    pub song_id: Option<&'a str>,
    pub title: &'a str,
    pub year: i32,
}

impl<'a> SongRow<'a> {
    pub fn new(song_id: &'a str, artist_id: &'a str, title: &'a str, artist_name: &'a str, duration: f64) -> Self {
        Self {
            artist_id: Some(artist_id),
            artist_name,
            duration,
            song_id: Some(song_id),
            title,
            year: 2008,
        }
    }
}

pub async fn insert_event(conn: &mut PgConnection, row: &EventRow<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO staging_events
            (artist, auth, firstName, gender, itemInSession, lastName, length, level,
             location, method, page, registration, sessionId, song, status, ts, userAgent, userId)
        VALUES ($1, 'Logged In', $2, $3, 0, $4, $5, $6, $7, 'PUT', $8, 1540500000000, $9, $10, 200, $11, $12, $13)
        "#,
    )
    .bind(row.artist)
    .bind(row.first_name)
    .bind(row.gender)
    .bind(row.last_name)
    .bind(row.length)
    .bind(row.level)
    .bind(row.location)
    .bind(row.page)
    .bind(row.session_id)
    .bind(row.song)
    .bind(row.ts)
    .bind(row.user_agent)
    .bind(row.user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_song(conn: &mut PgConnection, row: &SongRow<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO staging_songs
            (artist_id, artist_latitude, artist_location, artist_longitude, artist_name,
             duration, num_songs, song_id, title, year)
        VALUES ($1, NULL, 'Detroit, MI', NULL, $2, $3, 1, $4, $5, $6)
        "#,
    )
    .bind(row.artist_id)
    .bind(row.artist_name)
    .bind(row.duration)
    .bind(row.song_id)
    .bind(row.title)
    .bind(row.year)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn count(conn: &mut PgConnection, table: &str) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(conn)
        .await?;
    Ok(total)
}
