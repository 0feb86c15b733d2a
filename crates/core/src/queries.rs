//! `INSERT ... SELECT` statements that populate the star schema from staging.
//!
//! Order matters: `songplays` reads both staging tables and `time` reads
//! `songplays`. None of these statements deduplicate against rows already in
//! the target, so running them twice without a schema reset duplicates rows.

use crate::statement::{Statement, Step};

/// `staging_events.page` value marking an actual playback.
pub const PLAYBACK_PAGE: &str = "NextSong";

/// Songplays: playback events joined to songs on exact title, artist name and duration.
pub const SONGPLAY_INSERT: &str = r#"
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT
    TIMESTAMP 'epoch' + e.ts / 1000 * INTERVAL '1 second' AS start_time,
    e.userId,
    e.level,
    s.song_id,
    s.artist_id,
    e.sessionId AS session_id,
    e.location,
    e.userAgent AS user_agent
FROM staging_events e, staging_songs s
WHERE e.page = $1
  AND e.song = s.title
  AND e.artist = s.artist_name
  AND e.length = s.duration
"#;

/// Users: one row per `userId`, taken from that user's latest playback event
/// so a free-to-paid upgrade keeps only the current `level`.
pub const USER_INSERT: &str = r#"
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT
    userId,
    firstName,
    lastName,
    gender,
    level
FROM (
    SELECT
        userId,
        firstName,
        lastName,
        gender,
        level,
        ROW_NUMBER() OVER (PARTITION BY userId ORDER BY ts DESC) AS recency
    FROM staging_events
    WHERE page = $1
      AND userId IS NOT NULL
) AS latest
WHERE recency = 1
"#;

/// Songs: one row per non-null `song_id`.
pub const SONG_INSERT: &str = r#"
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT
    song_id,
    title,
    artist_id,
    year,
    duration
FROM (
    SELECT
        song_id,
        title,
        artist_id,
        year,
        duration,
        ROW_NUMBER() OVER (PARTITION BY song_id ORDER BY year DESC, title) AS pick
    FROM staging_songs
    WHERE song_id IS NOT NULL
) AS catalog
WHERE pick = 1
"#;

/// Artists: one row per non-null `artist_id`.
pub const ARTIST_INSERT: &str = r#"
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT
    artist_id,
    artist_name,
    artist_location,
    artist_latitude,
    artist_longitude
FROM (
    SELECT
        artist_id,
        artist_name,
        artist_location,
        artist_latitude,
        artist_longitude,
        ROW_NUMBER() OVER (PARTITION BY artist_id ORDER BY artist_name, artist_location) AS pick
    FROM staging_songs
    WHERE artist_id IS NOT NULL
) AS catalog
WHERE pick = 1
"#;

/// Time: one row per distinct songplay start time. `dayofweek` counts from Sunday = 0.
pub const TIME_INSERT: &str = r#"
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT
    start_time,
    EXTRACT(hour FROM start_time),
    EXTRACT(day FROM start_time),
    EXTRACT(week FROM start_time),
    EXTRACT(month FROM start_time),
    EXTRACT(year FROM start_time),
    EXTRACT(dayofweek FROM start_time)
FROM (SELECT DISTINCT start_time FROM songplays) AS starts
"#;

/// The five final-table inserts in execution order.
pub fn insert_statements() -> Vec<Statement> {
    vec![
        Statement::new(Step::InsertFinal, "songplays", SONGPLAY_INSERT).bind(PLAYBACK_PAGE),
        Statement::new(Step::InsertFinal, "users", USER_INSERT).bind(PLAYBACK_PAGE),
        Statement::new(Step::InsertFinal, "songs", SONG_INSERT),
        Statement::new(Step::InsertFinal, "artists", ARTIST_INSERT),
        Statement::new(Step::InsertFinal, "time", TIME_INSERT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_run_fact_first_and_time_last() {
        let labels: Vec<_> = insert_statements().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["songplays", "users", "songs", "artists", "time"]);
    }

    #[test]
    fn playback_filter_is_bound_not_inlined() {
        for stmt in insert_statements() {
            assert!(!stmt.sql.contains(PLAYBACK_PAGE), "{} inlines the sentinel", stmt.label);
        }
        let bound: Vec<_> = insert_statements()
            .into_iter()
            .filter(|s| s.is_parameterized())
            .map(|s| (s.label, s.params))
            .collect();
        assert_eq!(
            bound,
            vec![
                ("songplays".to_string(), vec![PLAYBACK_PAGE.to_string()]),
                ("users".to_string(), vec![PLAYBACK_PAGE.to_string()]),
            ]
        );
    }

    #[test]
    fn songplay_join_is_exact_on_three_keys() {
        assert!(SONGPLAY_INSERT.contains("e.song = s.title"));
        assert!(SONGPLAY_INSERT.contains("e.artist = s.artist_name"));
        assert!(SONGPLAY_INSERT.contains("e.length = s.duration"));
        assert!(SONGPLAY_INSERT.contains("TIMESTAMP 'epoch' + e.ts / 1000 * INTERVAL '1 second'"));
    }

    #[test]
    fn dimensions_keep_one_row_per_key_and_skip_null_ids() {
        for (sql, key) in [(USER_INSERT, "userId"), (SONG_INSERT, "song_id"), (ARTIST_INSERT, "artist_id")] {
            assert!(sql.contains(&format!("PARTITION BY {key} ORDER BY")), "{key}");
            assert!(sql.contains(&format!("{key} IS NOT NULL")), "{key}");
        }
        assert!(USER_INSERT.contains("ORDER BY ts DESC"));
        assert!(USER_INSERT.contains("WHERE recency = 1"));
        assert!(TIME_INSERT.contains("SELECT DISTINCT start_time FROM songplays"));
    }
}
