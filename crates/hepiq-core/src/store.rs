//! SQLite-backed record store for tickets and administrator pending actions.
//!
//! Every method is a single statement against one row, so each call is atomic
//! on its own. Nothing here spans two writes.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use rusqlite::{
    params,
    types::{FromSql, FromSqlError, FromSqlResult, ValueRef},
    Connection, OptionalExtension, Row,
};

use crate::{
    domain::{
        AdminPending, ChatId, Department, NewTicket, PendingKind, Stage, StudyType, Ticket,
        TicketId, TicketStatus,
    },
    errors::Error,
    Result,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_chat_id INTEGER NOT NULL,
    student_fullname TEXT NOT NULL,
    department TEXT NOT NULL,
    stage INTEGER NOT NULL,
    study_type TEXT NOT NULL,
    description TEXT NOT NULL,
    photo_file_id TEXT,
    status TEXT NOT NULL,
    admin_chat_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_pending (
    admin_chat_id INTEGER PRIMARY KEY,
    action TEXT NOT NULL,
    ticket_id INTEGER NOT NULL
);
";

const TICKET_COLUMNS: &str = "id, student_chat_id, student_fullname, department, stage, \
     study_type, description, photo_file_id, status, admin_chat_id, created_at, updated_at";

pub struct TicketStore {
    conn: Mutex<Connection>,
}

impl TicketStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::External("ticket store lock poisoned".to_string()))
    }

    /// Insert a ticket with status `NEW` and return its freshly assigned id.
    pub fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketId> {
        let ts = now_iso();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tickets (
                student_chat_id, student_fullname, department, stage, study_type,
                description, photo_file_id, status, admin_chat_id, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                ticket.student_chat_id.0,
                ticket.student_fullname,
                ticket.department.label(),
                ticket.stage.get(),
                ticket.study_type.label(),
                ticket.description,
                ticket.photo_file_id,
                TicketStatus::New.as_str(),
                ticket.admin_chat_id.0,
                ts,
                ts,
            ],
        )?;
        Ok(TicketId(conn.last_insert_rowid()))
    }

    pub fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let conn = self.conn()?;
        let ticket = conn
            .query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
                params![id.0],
                ticket_from_row,
            )
            .optional()?;
        Ok(ticket)
    }

    /// Set `status` and bump `updated_at`.
    ///
    /// The value is written as given; transition legality is not checked.
    /// Updating a missing ticket is a no-op.
    pub fn update_ticket_status(&self, id: TicketId, status: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, now_iso(), id.0],
        )?;
        Ok(())
    }

    /// Upsert: replaces any pending action already recorded for `admin`.
    pub fn set_admin_pending(
        &self,
        admin: ChatId,
        kind: PendingKind,
        ticket_id: TicketId,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO admin_pending (admin_chat_id, action, ticket_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(admin_chat_id) DO UPDATE SET
                action = excluded.action,
                ticket_id = excluded.ticket_id",
            params![admin.0, kind.as_str(), ticket_id.0],
        )?;
        Ok(())
    }

    pub fn get_admin_pending(&self, admin: ChatId) -> Result<Option<AdminPending>> {
        let conn = self.conn()?;
        let pending = conn
            .query_row(
                "SELECT admin_chat_id, action, ticket_id FROM admin_pending WHERE admin_chat_id = ?1",
                params![admin.0],
                |row| {
                    Ok(AdminPending {
                        admin_chat_id: ChatId(row.get(0)?),
                        kind: row.get(1)?,
                        ticket_id: TicketId(row.get(2)?),
                    })
                },
            )
            .optional()?;
        Ok(pending)
    }

    /// Idempotent.
    pub fn clear_admin_pending(&self, admin: ChatId) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM admin_pending WHERE admin_chat_id = ?1",
            params![admin.0],
        )?;
        Ok(())
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: TicketId(row.get(0)?),
        student_chat_id: ChatId(row.get(1)?),
        student_fullname: row.get(2)?,
        department: row.get(3)?,
        stage: row.get(4)?,
        study_type: row.get(5)?,
        description: row.get(6)?,
        photo_file_id: row.get(7)?,
        status: row.get(8)?,
        admin_chat_id: ChatId(row.get(9)?),
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn parse_text<T>(
    value: ValueRef<'_>,
    what: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> FromSqlResult<T> {
    let s = value.as_str()?;
    parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown {what}: {s}").into()))
}

impl FromSql for Department {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_text(value, "department", Department::from_label)
    }
}

impl FromSql for StudyType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_text(value, "study type", StudyType::from_label)
    }
}

impl FromSql for PendingKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_text(value, "pending action", PendingKind::parse)
    }
}

impl FromSql for Stage {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let n = value.as_i64()?;
        u8::try_from(n)
            .ok()
            .and_then(Stage::new)
            .ok_or(FromSqlError::OutOfRange(n))
    }
}
