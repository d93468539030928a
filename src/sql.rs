//! SQL text for the warehouse schema, staging loads, and transforms.
//!
//! The bulk-copy statements are built by interpolating configuration values
//! (paths, role ARN, region) into the warehouse's COPY grammar; those values
//! pass through [`quote_literal`] first so a stray quote in configuration
//! cannot change the statement shape. Everything else is fixed text.

/// Leading-letter shards of the song catalog, one COPY batch per letter.
pub const SONG_PREFIXES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Escape a value for embedding inside a single-quoted SQL literal.
pub fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Idempotent drop for one table.
///
/// CASCADE so a leftover fact table from a previous run never blocks
/// dropping the dimensions it references.
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table} CASCADE;")
}

// ============ Staging tables ============

pub const STAGING_EVENTS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS staging_events (
    eventId       INTEGER IDENTITY(0, 1) PRIMARY KEY,
    artist        VARCHAR DISTKEY,
    auth          VARCHAR,
    firstName     VARCHAR,
    gender        VARCHAR(1),
    itemInSession INTEGER,
    lastName      VARCHAR,
    length        FLOAT,
    level         VARCHAR,
    location      VARCHAR,
    method        VARCHAR(7),
    page          VARCHAR,
    registration  BIGINT,
    sessionId     INTEGER,
    song          VARCHAR SORTKEY,
    status        SMALLINT,
    ts            TIMESTAMP,
    userAgent     VARCHAR,
    userId        INTEGER
) DISTSTYLE KEY;";

pub const STAGING_SONGS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS staging_songs (
    song_id          VARCHAR PRIMARY KEY SORTKEY,
    num_songs        INTEGER,
    title            VARCHAR(1024),
    artist_name      VARCHAR(1024),
    artist_latitude  FLOAT,
    year             SMALLINT,
    duration         FLOAT,
    artist_id        VARCHAR DISTKEY,
    artist_longitude FLOAT,
    artist_location  VARCHAR(1024)
) DISTSTYLE KEY;";

/// Bulk-copy of the raw event logs into staging_events.
///
/// Event timestamps arrive as epoch milliseconds; blank and empty strings
/// land as NULL so the staging row mirrors the raw record.
pub fn copy_staging_events(
    log_data: &str,
    log_json_path: &str,
    role_arn: &str,
    region: &str,
) -> String {
    format!(
        "COPY staging_events FROM '{}' CREDENTIALS 'aws_iam_role={}' \
         TIMEFORMAT AS 'epochmillisecs' REGION '{}' JSON '{}' \
         TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;",
        quote_literal(log_data),
        quote_literal(role_arn),
        quote_literal(region),
        quote_literal(log_json_path),
    )
}

/// Bulk-copy of one leading-letter shard of the song catalog.
pub fn copy_staging_songs_batch(
    song_data: &str,
    prefix: char,
    role_arn: &str,
    region: &str,
) -> String {
    format!(
        "COPY staging_songs FROM '{}/{}' CREDENTIALS 'aws_iam_role={}' \
         REGION '{}' JSON 'auto' \
         TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;",
        quote_literal(song_data),
        prefix,
        quote_literal(role_arn),
        quote_literal(region),
    )
}

// ============ Dimension tables ============

pub const USERS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    first_name VARCHAR NOT NULL,
    last_name  VARCHAR NOT NULL,
    gender     VARCHAR(1) NOT NULL,
    level      VARCHAR NOT NULL
) DISTSTYLE ALL;";

pub const ARTISTS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS artists (
    artist_id VARCHAR PRIMARY KEY,
    name      VARCHAR(1024) NOT NULL,
    location  VARCHAR(1024),
    latitude  FLOAT,
    longitude FLOAT
) DISTSTYLE ALL;";

pub const SONGS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS songs (
    song_id   VARCHAR PRIMARY KEY,
    title     VARCHAR(1024) NOT NULL,
    artist_id VARCHAR NOT NULL REFERENCES artists(artist_id) DISTKEY SORTKEY,
    year      SMALLINT,
    duration  FLOAT
) DISTSTYLE KEY;";

pub const TIME_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS time (
    start_time TIMESTAMP PRIMARY KEY,
    hour       SMALLINT NOT NULL,
    day        SMALLINT NOT NULL,
    week       SMALLINT NOT NULL,
    month      SMALLINT NOT NULL,
    year       SMALLINT NOT NULL,
    weekday    SMALLINT NOT NULL
) DISTSTYLE ALL;";

// ============ Fact table ============

pub const SONGPLAYS_CREATE: &str = "\
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id INTEGER IDENTITY(0, 1) PRIMARY KEY,
    start_time  TIMESTAMP NOT NULL REFERENCES time(start_time),
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    level       VARCHAR NOT NULL,
    song_id     VARCHAR NOT NULL REFERENCES songs(song_id) SORTKEY,
    artist_id   VARCHAR NOT NULL REFERENCES artists(artist_id) DISTKEY,
    session_id  INTEGER NOT NULL,
    location    VARCHAR NOT NULL,
    user_agent  VARCHAR NOT NULL
) DISTSTYLE KEY;";

// ============ Transforms ============
//
// Each derivation deduplicates with SELECT DISTINCT and filters NULL natural
// keys. None of these are re-runnable against non-empty targets; the stage
// assumes freshly created tables.

pub const USERS_INSERT: &str = "\
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT DISTINCT userId AS user_id,
       firstName AS first_name,
       lastName AS last_name,
       gender,
       level
FROM staging_events
WHERE userId IS NOT NULL;";

pub const SONGS_INSERT: &str = "\
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT song_id,
       title,
       artist_id,
       year,
       duration
FROM staging_songs
WHERE song_id IS NOT NULL;";

pub const ARTISTS_INSERT: &str = "\
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT artist_id,
       artist_name AS name,
       artist_location AS location,
       artist_latitude AS latitude,
       artist_longitude AS longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;";

pub const TIME_INSERT: &str = "\
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT ts AS start_time,
       DATE_PART(HOUR, ts) AS hour,
       DATE_PART(DAY, ts) AS day,
       DATE_PART(WEEK, ts) AS week,
       DATE_PART(MONTH, ts) AS month,
       DATE_PART(YEAR, ts) AS year,
       DATE_PART(WEEKDAY, ts) AS weekday
FROM staging_events
WHERE ts IS NOT NULL;";

/// Inner join on (artist name, song title): plays with no catalog match are
/// silently dropped, and only 'NextSong' page events qualify.
pub const SONGPLAYS_INSERT: &str = "\
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id,
                       session_id, location, user_agent)
SELECT staging_events.ts AS start_time,
       staging_events.userId AS user_id,
       staging_events.level,
       staging_songs.song_id,
       staging_songs.artist_id,
       staging_events.sessionId AS session_id,
       staging_events.location,
       staging_events.userAgent AS user_agent
FROM staging_events
JOIN staging_songs
  ON staging_events.artist = staging_songs.artist_name
 AND staging_events.song = staging_songs.title
WHERE staging_events.page = 'NextSong';";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_literal_doubles_single_quotes() {
        assert_eq!(quote_literal("it's"), "it''s");
        assert_eq!(quote_literal("plain"), "plain");
    }

    #[test]
    fn events_copy_matches_warehouse_grammar() {
        let statement = copy_staging_events(
            "s3://udacity-dend/log_data",
            "s3://udacity-dend/log_json_path.json",
            "arn:aws:iam::123456789012:role/sparkify-role",
            "us-west-2",
        );
        assert_eq!(
            statement,
            "COPY staging_events FROM 's3://udacity-dend/log_data' \
             CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/sparkify-role' \
             TIMEFORMAT AS 'epochmillisecs' REGION 'us-west-2' \
             JSON 's3://udacity-dend/log_json_path.json' \
             TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;"
        );
    }

    #[test]
    fn songs_copy_targets_letter_prefix() {
        let statement = copy_staging_songs_batch(
            "s3://udacity-dend/song_data",
            'Q',
            "arn:aws:iam::123456789012:role/sparkify-role",
            "us-west-2",
        );
        assert!(statement.starts_with("COPY staging_songs FROM 's3://udacity-dend/song_data/Q'"));
        assert!(statement.contains("JSON 'auto'"));
        assert!(!statement.contains("TIMEFORMAT"));
    }

    #[test]
    fn copy_escapes_configuration_values() {
        let statement = copy_staging_events("s3://bucket/o'brien", "auto", "arn", "us-west-2");
        assert!(statement.contains("FROM 's3://bucket/o''brien'"));
    }

    #[test]
    fn transforms_deduplicate_and_filter_null_keys() {
        for (insert, key) in [
            (USERS_INSERT, "userId"),
            (SONGS_INSERT, "song_id"),
            (ARTISTS_INSERT, "artist_id"),
            (TIME_INSERT, "ts"),
        ] {
            assert!(insert.contains("SELECT DISTINCT"), "missing DISTINCT: {insert}");
            assert!(
                insert.contains(&format!("WHERE {key} IS NOT NULL")),
                "missing NULL filter: {insert}"
            );
        }
    }

    #[test]
    fn songplays_uses_inner_join_and_page_filter() {
        assert!(SONGPLAYS_INSERT.contains("JOIN staging_songs"));
        assert!(!SONGPLAYS_INSERT.contains("LEFT JOIN"));
        assert!(SONGPLAYS_INSERT.contains("staging_events.page = 'NextSong'"));
    }

    #[test]
    fn drops_are_idempotent() {
        assert_eq!(
            drop_table("users"),
            "DROP TABLE IF EXISTS users CASCADE;"
        );
    }
}
