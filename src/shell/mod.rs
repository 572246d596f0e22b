//! Interactive login and role menu.
//!
//! `LoggedOut -> Menu(role) -> dispatch -> Menu(role) -> ... -> LoggedOut`.
//! End of input at any prompt finishes the session.

pub mod menu;
pub mod render;

use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use crate::auth::{self, LoginOutcome, Session};
use crate::store::{self, StoreError, UpsertOutcome};
use menu::Action;

enum State {
    LoggedOut,
    Menu(Session),
    Done,
}

pub struct Shell<'c, R, W> {
    conn: &'c mut Connection,
    input: R,
    output: W,
}

impl<'c, R: BufRead, W: Write> Shell<'c, R, W> {
    pub fn new(conn: &'c mut Connection, input: R, output: W) -> Self {
        Self {
            conn,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nWelcome to the school database")?;
        let mut state = State::LoggedOut;
        loop {
            state = match state {
                State::LoggedOut => self.logged_out()?,
                State::Menu(session) => self.menu(session)?,
                State::Done => break,
            };
        }
        self.output.flush()
    }

    fn logged_out(&mut self) -> io::Result<State> {
        let Some(username) = self.prompt("User name: ")? else {
            return Ok(State::Done);
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(State::Done);
        };

        match auth::login(self.conn, &username, &password) {
            Ok(LoginOutcome::Authenticated(session)) => {
                writeln!(self.output, "role: {}", session.role)?;
                Ok(State::Menu(session))
            }
            Ok(LoginOutcome::Rejected) => {
                writeln!(self.output, "login unsuccessful")?;
                Ok(State::LoggedOut)
            }
            Err(e) => {
                self.report(&e)?;
                Ok(State::LoggedOut)
            }
        }
    }

    fn menu(&mut self, session: Session) -> io::Result<State> {
        writeln!(self.output, "\nChoose options below:")?;
        for (key, label, _) in menu::entries(session.role) {
            writeln!(self.output, "{key}: {label}")?;
        }
        let Some(choice) = self.prompt("option: ")? else {
            return Ok(State::Done);
        };

        let Some(action) = menu::parse(session.role, &choice) else {
            writeln!(self.output, "unrecognized choice")?;
            return Ok(State::Menu(session));
        };
        tracing::debug!(user_id = session.user_id, username = %session.username, ?action, "menu selection");

        let res = match action {
            Action::Exit => return Ok(State::LoggedOut),
            Action::ShowRanking => self.show_ranking(),
            Action::ShowResults => self.show_results(),
            Action::RegisterResult => self.register_result(),
        };
        match res {
            Ok(true) => Ok(State::Menu(session)),
            Ok(false) => Ok(State::Done),
            Err(ActionError::Store(e)) => {
                self.report(&e)?;
                Ok(State::Menu(session))
            }
            Err(ActionError::Io(e)) => Err(e),
        }
    }

    // Each action returns Ok(false) when input ran out mid-prompt.

    fn show_ranking(&mut self) -> Result<bool, ActionError> {
        let ranked = store::rank_students(self.conn)?;
        render::write_ranking(&mut self.output, &ranked)?;
        Ok(true)
    }

    fn show_results(&mut self) -> Result<bool, ActionError> {
        let Some(id_number) = self.prompt("student id number: ")? else {
            return Ok(false);
        };
        let Some(subject) = self.prompt("subject name (optional): ")? else {
            return Ok(false);
        };
        let lines = store::fetch_results(self.conn, &id_number, Some(subject.as_str()))?;
        render::write_results(&mut self.output, &id_number, lines.as_deref())?;
        Ok(true)
    }

    fn register_result(&mut self) -> Result<bool, ActionError> {
        let Some(id_number) = self.prompt("student id number: ")? else {
            return Ok(false);
        };
        let Some(subject) = self.prompt("subject name: ")? else {
            return Ok(false);
        };
        let Some(raw_points) = self.prompt("points: ")? else {
            return Ok(false);
        };
        let points: i64 = raw_points.trim().parse().map_err(|_| {
            StoreError::invalid("points", format!("{:?} is not a whole number", raw_points.trim()))
        })?;

        let outcome = store::upsert_result(self.conn, &id_number, &subject, points)?;
        let verb = match outcome {
            UpsertOutcome::Inserted => "registered",
            UpsertOutcome::Updated => "updated",
        };
        writeln!(self.output, "result {verb} successfully.")?;
        Ok(true)
    }

    fn report(&mut self, e: &StoreError) -> io::Result<()> {
        tracing::warn!(code = e.code(), error = %e, "operation failed");
        writeln!(self.output, "error: {e}")
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        // Raw bytes so a line that is not UTF-8 becomes bad input, not an I/O error.
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&line);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

enum ActionError {
    Store(StoreError),
    Io(io::Error),
}

impl From<StoreError> for ActionError {
    fn from(e: StoreError) -> Self {
        ActionError::Store(e)
    }
}

impl From<io::Error> for ActionError {
    fn from(e: io::Error) -> Self {
        ActionError::Io(e)
    }
}
