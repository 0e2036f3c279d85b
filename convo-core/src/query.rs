//! Running SQL through an external query tool.
//!
//! The session id travels as a psql variable and is referenced in the SQL as
//! `:'chat_session_id'`, so psql quotes it as a literal instead of the text
//! being spliced into the statement.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ConvoError, Result};

pub const DEFAULT_QUERY_PROGRAM: &str = "psql";
pub const SESSION_ID_VARIABLE: &str = "chat_session_id";

const SESSION_MESSAGES_SQL: &str = "\
SELECT json_build_object('user_input', m.user_input, 'assistant_response', m.assistant_response)
FROM conversation_messages m
WHERE m.conversation_id = (
    SELECT c.id FROM conversations c
    WHERE c.chat_session_id = :'chat_session_id'
    ORDER BY c.created_at ASC
    LIMIT 1
)
ORDER BY m.created_at ASC;
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub text: String,
    pub bindings: Vec<(String, String)>,
}

impl SessionQuery {
    /// One JSON object per message of the session's conversation, oldest first.
    pub fn messages_for(chat_session_id: &str) -> Self {
        Self {
            text: SESSION_MESSAGES_SQL.to_string(),
            bindings: vec![(SESSION_ID_VARIABLE.to_string(), chat_session_id.to_string())],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

pub trait QueryRunner {
    fn run_query(&self, connection_target: &str, query: &SessionQuery) -> Result<QueryOutput>;
}

/// Runs queries with `psql` in tuples-only, unaligned mode.
#[derive(Debug, Clone)]
pub struct PsqlRunner {
    program: String,
}

impl PsqlRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, connection_target: &str, query: &SessionQuery) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(connection_target)
            .args(["-X", "-q", "-t", "-A", "-v", "ON_ERROR_STOP=1"]);
        for (name, value) in &query.bindings {
            command.arg("-v").arg(format!("{name}={value}"));
        }
        command.args(["-f", "-"]);
        command
    }
}

impl Default for PsqlRunner {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_PROGRAM)
    }
}

impl QueryRunner for PsqlRunner {
    fn run_query(&self, connection_target: &str, query: &SessionQuery) -> Result<QueryOutput> {
        let spawn_error = |source| ConvoError::QuerySpawn {
            program: self.program.clone(),
            source,
        };

        debug!(program = %self.program, "running session query");
        let mut child = self
            .command(connection_target, query)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(err) = stdin.write_all(query.text.as_bytes())
            && err.kind() != ErrorKind::BrokenPipe
        {
            return Err(spawn_error(err));
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        let stdout = String::from_utf8(output.stdout).map_err(|_| ConvoError::NonUtf8Output {
            program: self.program.clone(),
        })?;

        Ok(QueryOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{PsqlRunner, SessionQuery};

    #[test]
    fn session_id_is_bound_not_interpolated() {
        let query = SessionQuery::messages_for("abc'; DROP TABLE conversations; --");

        assert!(!query.text.contains("DROP TABLE"));
        assert!(query.text.contains(":'chat_session_id'"));
        assert_eq!(
            query.bindings,
            vec![(
                "chat_session_id".to_string(),
                "abc'; DROP TABLE conversations; --".to_string()
            )]
        );
    }

    #[test]
    fn query_orders_messages_oldest_first() {
        let query = SessionQuery::messages_for("s-1");
        assert!(query.text.contains("'user_input'"));
        assert!(query.text.contains("'assistant_response'"));
        assert!(query.text.trim_end().ends_with("ORDER BY m.created_at ASC;"));
    }

    #[test]
    fn psql_command_uses_tuples_only_unaligned_mode() {
        let runner = PsqlRunner::new("psql");
        let command = runner.command("postgres://db", &SessionQuery::messages_for("s-1"));

        let args = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(command.get_program(), "psql");
        assert_eq!(args[0], "postgres://db");
        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"-A".to_string()));
        assert!(args.contains(&"chat_session_id=s-1".to_string()));
        assert!(args.ends_with(&["-f".to_string(), "-".to_string()]));
    }

    #[cfg(unix)]
    #[test]
    fn missing_program_is_a_spawn_error() {
        use super::QueryRunner;

        let runner = PsqlRunner::new("/nonexistent/convo-query-tool");
        let err = runner
            .run_query("postgres://db", &SessionQuery::messages_for("s-1"))
            .expect_err("must fail");
        assert!(format!("{err}").contains("failed to start query program"));
    }
}
