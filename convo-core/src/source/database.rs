use std::env;

use tracing::debug;

use crate::error::{ConvoError, Result};
use crate::query::{DEFAULT_QUERY_PROGRAM, PsqlRunner, QueryRunner, SessionQuery};
use crate::source::LineSource;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const QUERY_PROGRAM_ENV: &str = "CONVO_PSQL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub connection_target: String,
    pub query_program: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let connection_target = lookup(DATABASE_URL_ENV)
            .filter(|value| !value.is_empty())
            .ok_or(ConvoError::MissingEnv {
                name: DATABASE_URL_ENV,
            })?;

        let query_program = lookup(QUERY_PROGRAM_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY_PROGRAM.to_string());

        Ok(Self {
            connection_target,
            query_program,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSource<R> {
    config: DatabaseConfig,
    runner: R,
    chat_session_id: String,
}

impl DatabaseSource<PsqlRunner> {
    pub fn with_psql(config: DatabaseConfig, chat_session_id: impl Into<String>) -> Self {
        let runner = PsqlRunner::new(config.query_program.clone());
        Self::new(config, runner, chat_session_id)
    }
}

impl<R: QueryRunner> DatabaseSource<R> {
    pub fn new(config: DatabaseConfig, runner: R, chat_session_id: impl Into<String>) -> Self {
        Self {
            config,
            runner,
            chat_session_id: chat_session_id.into(),
        }
    }
}

impl<R: QueryRunner> LineSource for DatabaseSource<R> {
    fn read_lines(&self) -> Result<Vec<String>> {
        let query = SessionQuery::messages_for(&self.chat_session_id);
        let output = self
            .runner
            .run_query(&self.config.connection_target, &query)?;

        if !output.success {
            return Err(ConvoError::QueryFailed {
                status: output.status,
                stderr: output.stderr.trim_end().to_string(),
            });
        }

        let lines = output
            .stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        debug!(
            chat_session_id = %self.chat_session_id,
            lines = lines.len(),
            "fetched conversation rows"
        );

        Ok(lines)
    }

    fn title(&self) -> String {
        self.chat_session_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::{DatabaseConfig, DatabaseSource};
    use crate::error::Result;
    use crate::query::{QueryOutput, QueryRunner, SessionQuery};
    use crate::source::LineSource;

    struct FakeRunner {
        output: QueryOutput,
        calls: RefCell<Vec<(String, SessionQuery)>>,
    }

    impl FakeRunner {
        fn new(output: QueryOutput) -> Self {
            Self {
                output,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl QueryRunner for &FakeRunner {
        fn run_query(&self, connection_target: &str, query: &SessionQuery) -> Result<QueryOutput> {
            self.calls
                .borrow_mut()
                .push((connection_target.to_string(), query.clone()));
            Ok(self.output.clone())
        }
    }

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            connection_target: "postgres://localhost/app".to_string(),
            query_program: "psql".to_string(),
        }
    }

    #[test]
    fn config_requires_database_url() {
        let err = DatabaseConfig::from_lookup(|_| None).expect_err("must fail");
        assert_eq!(
            format!("{err}"),
            "DATABASE_URL environment variable is required"
        );

        let err = DatabaseConfig::from_lookup(|_| Some(String::new())).expect_err("must fail");
        assert!(format!("{err}").contains("DATABASE_URL"));
    }

    #[test]
    fn config_reads_query_program_override() {
        let vars = HashMap::from([
            ("DATABASE_URL", "postgres://db"),
            ("CONVO_PSQL", "/opt/pg/bin/psql"),
        ]);
        let config = DatabaseConfig::from_lookup(|name| vars.get(name).map(ToString::to_string))
            .expect("config");
        assert_eq!(config.connection_target, "postgres://db");
        assert_eq!(config.query_program, "/opt/pg/bin/psql");

        let config = DatabaseConfig::from_lookup(|name| {
            (name == "DATABASE_URL").then(|| "postgres://db".to_string())
        })
        .expect("config");
        assert_eq!(config.query_program, "psql");
    }

    #[test]
    fn filters_blank_rows_and_passes_target() {
        let runner = FakeRunner::new(QueryOutput {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: "{\"user_input\":null}\n\n   \n{\"assistant_response\":null}\n".to_string(),
            stderr: String::new(),
        });

        let source = DatabaseSource::new(config(), &runner, "session-42");
        let lines = source.read_lines().expect("read");
        assert_eq!(
            lines,
            vec!["{\"user_input\":null}", "{\"assistant_response\":null}"]
        );
        assert_eq!(source.title(), "session-42");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "postgres://localhost/app");
        assert_eq!(calls[0].1, SessionQuery::messages_for("session-42"));
    }

    #[test]
    fn failed_query_surfaces_stderr() {
        let runner = FakeRunner::new(QueryOutput {
            success: false,
            status: "exit status: 2".to_string(),
            stdout: String::new(),
            stderr: "psql: error: connection refused\n".to_string(),
        });

        let err = DatabaseSource::new(config(), &runner, "session-42")
            .read_lines()
            .expect_err("must fail");
        assert_eq!(
            format!("{err}"),
            "query program failed (exit status: 2): psql: error: connection refused"
        );
    }
}
