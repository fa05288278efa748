//! SQLite-backed [`CodeStore`].
//!
//! # Schema
//!
//! - `code_nodes`: one row per node `(id, code UNIQUE, description, parent_id)`, with
//!   `parent_id` referencing `code_nodes(id)` and indexed for the reverse (children) lookup.
//!
//! The connection runs in WAL mode so readers are not blocked by an import in progress.
//! Visibility of a concurrent import's writes is whatever SQLite's isolation gives.

use super::{fold_case, CodeStore};
use crate::error::{CodeError, CodeResult};
use crate::node::{CodeNode, UpsertOutcome};
use crate::uuid::NodeId;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Name of the SQL function used for case-insensitive matching.
const FOLD_CASE_FN: &str = "fold_case";

const NODE_COLUMNS: &str = "id, code, description, parent_id";

type RawNode = (String, String, String, Option<String>);

/// SQLite database holding the classification forest.
///
/// The connection is wrapped in a `Mutex` so the store is `Send + Sync` and can be shared
/// with request handlers.
pub struct SqliteCodeStore {
    conn: Mutex<Connection>,
}

impl SqliteCodeStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> CodeResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CodeError::DatabaseDirCreation)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> CodeResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CodeResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.create_scalar_function(
            FOLD_CASE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(fold_case(&ctx.get::<String>(0)?)),
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn conn(&self) -> CodeResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CodeError::StorePoisoned)
    }

    fn create_schema(&self) -> CodeResult<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS code_nodes (
                id TEXT PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL,
                parent_id TEXT REFERENCES code_nodes(id)
            );

            CREATE INDEX IF NOT EXISTS idx_code_nodes_parent_id ON code_nodes(parent_id);
            "#,
        )?;
        Ok(())
    }

    fn query_nodes(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> CodeResult<Vec<CodeNode>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, raw_node)?
            .collect::<rusqlite::Result<Vec<RawNode>>>()?;
        rows.into_iter().map(into_node).collect()
    }

    fn query_node(&self, sql: &str, params: impl rusqlite::Params) -> CodeResult<Option<CodeNode>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(sql)?;
        stmt.query_row(params, raw_node)
            .optional()?
            .map(into_node)
            .transpose()
    }
}

impl CodeStore for SqliteCodeStore {
    fn find_by_code(&self, code: &str) -> CodeResult<Option<CodeNode>> {
        self.query_node(
            &format!("SELECT {NODE_COLUMNS} FROM code_nodes WHERE code = ?1"),
            [code],
        )
    }

    fn find_by_id(&self, id: &NodeId) -> CodeResult<Option<CodeNode>> {
        self.query_node(
            &format!("SELECT {NODE_COLUMNS} FROM code_nodes WHERE id = ?1"),
            [id.to_string()],
        )
    }

    fn upsert(
        &self,
        code: &str,
        description: &str,
        parent_id: Option<NodeId>,
    ) -> CodeResult<(CodeNode, UpsertOutcome)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM code_nodes WHERE code = ?1",
                [code],
                |row| row.get(0),
            )
            .optional()?;
        let outcome = match existing {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        };

        let parent = parent_id.map(|p| p.to_string());
        let raw = tx.query_row(
            &format!(
                "INSERT INTO code_nodes (id, code, description, parent_id)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(code) DO UPDATE SET
                     description = excluded.description,
                     parent_id = excluded.parent_id
                 RETURNING {NODE_COLUMNS}"
            ),
            params![NodeId::new().to_string(), code, description, parent],
            raw_node,
        )?;
        tx.commit()?;

        Ok((into_node(raw)?, outcome))
    }

    fn children_of(&self, id: &NodeId) -> CodeResult<Vec<CodeNode>> {
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM code_nodes WHERE parent_id = ?1 ORDER BY code"),
            [id.to_string()],
        )
    }

    fn roots(&self) -> CodeResult<Vec<CodeNode>> {
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM code_nodes WHERE parent_id IS NULL ORDER BY code"),
            [],
        )
    }

    fn count(&self) -> CodeResult<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM code_nodes", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn search_leaves(&self, needle: &str, limit: usize) -> CodeResult<Vec<CodeNode>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM code_nodes n
                 WHERE (instr({FOLD_CASE_FN}(n.code), ?1) > 0
                        OR instr({FOLD_CASE_FN}(n.description), ?1) > 0)
                   AND NOT EXISTS (SELECT 1 FROM code_nodes c WHERE c.parent_id = n.id)
                 ORDER BY n.code
                 LIMIT ?2"
            ),
            params![fold_case(needle), limit],
        )
    }
}

fn raw_node(row: &Row<'_>) -> rusqlite::Result<RawNode> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_node((id, code, description, parent_id): RawNode) -> CodeResult<CodeNode> {
    Ok(CodeNode {
        id: stored_id(&id)?,
        code,
        description,
        parent_id: parent_id.as_deref().map(stored_id).transpose()?,
    })
}

fn stored_id(raw: &str) -> CodeResult<NodeId> {
    NodeId::parse(raw).map_err(|_| CodeError::CorruptNodeId(raw.to_string()))
}
