//! Integration tests for floe's configuration and statement plans.

use floe::{Config, load, schema, sql, transform};

fn sample_yaml() -> String {
    r#"
aws:
  region: us-west-2
  access_key_id: AKIAEXAMPLE
  secret_access_key: secret

warehouse:
  host: cluster.abc123.us-west-2.redshift.amazonaws.com
  port: 5439
  database: sparkify
  master_username: admin
  master_password: hunter2
  cluster_identifier: sparkify-cluster
  cluster_type: multi-node
  node_type: dc2.large
  number_of_nodes: 4

iam:
  role_name: sparkify-role
  role_arn: arn:aws:iam::123456789012:role/sparkify-role

s3:
  log_data: s3://udacity-dend/log_data
  log_json_path: s3://udacity-dend/log_json_path.json
  song_data: s3://udacity-dend/song_data

stack:
  name: sparkify
  template_path: ./stack-template.json
  poll_interval_secs: 30
"#
    .to_string()
}

fn sample_config() -> Config {
    serde_yaml::from_str(&sample_yaml()).unwrap()
}

mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_yaml().as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.aws.region, "us-west-2");
        assert_eq!(config.warehouse.port, 5439);
        assert_eq!(config.stack.poll_interval_secs, 30);
    }

    #[test]
    fn test_config_interpolates_environment() {
        std::env::set_var("FLOE_IT_SECRET", "from-env");
        let yaml = sample_yaml().replace("secret_access_key: secret",
            "secret_access_key: ${FLOE_IT_SECRET}");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.aws.secret_access_key, "from-env");
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        std::env::remove_var("FLOE_IT_MISSING");
        let yaml = sample_yaml().replace("secret_access_key: secret",
            "secret_access_key: ${FLOE_IT_MISSING}");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let error = Config::from_file(file.path()).unwrap_err();
        assert!(error.to_string().contains("interpolation"));
    }
}

mod plan_tests {
    use super::*;

    /// The full pipeline plan in execution order: schema reset, staging
    /// loads, transforms.
    #[test]
    fn test_full_run_statement_counts() {
        let config = sample_config();
        assert_eq!(schema::statements().len(), 14);
        assert_eq!(load::statements(&config).len(), 27);
        assert_eq!(transform::statements().len(), 5);
    }

    #[test]
    fn test_events_copy_shape_is_exact() {
        let config = sample_config();
        let plan = load::statements(&config);
        assert_eq!(
            plan[0].sql,
            "COPY staging_events FROM 's3://udacity-dend/log_data' \
             CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/sparkify-role' \
             TIMEFORMAT AS 'epochmillisecs' REGION 'us-west-2' \
             JSON 's3://udacity-dend/log_json_path.json' \
             TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;"
        );
    }

    #[test]
    fn test_song_batches_span_the_alphabet() {
        let config = sample_config();
        let plan = load::statements(&config);
        let batches = &plan[1..];
        assert_eq!(batches.len(), sql::SONG_PREFIXES.len());
        for (statement, prefix) in batches.iter().zip(sql::SONG_PREFIXES.chars()) {
            assert!(
                statement
                    .sql
                    .contains(&format!("FROM 's3://udacity-dend/song_data/{prefix}'")),
                "batch {prefix} targets the wrong prefix: {}",
                statement.sql
            );
        }
    }

    #[test]
    fn test_transforms_precede_songplays() {
        let plan = transform::statements();
        let songplays = plan
            .iter()
            .position(|s| s.sql.starts_with("INSERT INTO songplays"))
            .unwrap();
        assert_eq!(songplays, plan.len() - 1);
    }

    #[test]
    fn test_schema_plan_only_touches_known_tables() {
        let tables = [
            "staging_events",
            "staging_songs",
            "users",
            "artists",
            "songs",
            "time",
            "songplays",
        ];
        for statement in schema::statements() {
            assert!(
                tables.iter().any(|t| statement.sql.contains(t)),
                "unexpected statement: {}",
                statement.sql
            );
        }
    }
}
