//! SQLite storage provider.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`. Frames are stored as their JSON wire
//! representation, keyed by `(address, idx)`, so a second frame at an
//! occupied index is rejected by the database itself.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode};
use tessera_core::{decode_line, encode_line, Address, AppendedFrame, ChainRef};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{ChainGuard, ChainLocks, StorageProvider};

/// SQLite-based store.
///
/// Thread-safe via an internal mutex around the connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    locks: ChainLocks,
}

impl SqliteStore {
    /// Open a database at `path`, creating it and running migrations as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            locks: ChainLocks::new(),
        }
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(format!("sqlite connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl StorageProvider for SqliteStore {
    async fn list_frames(&self, _party: &Address, address: &Address) -> Result<Vec<AppendedFrame>> {
        let address = address.clone();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT idx, representation FROM frames WHERE address = ?1 ORDER BY idx ASC",
            )?;
            let rows = stmt
                .query_map(params![address.as_str()], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(idx, representation)| {
                    decode_line(&representation).map_err(|source| StoreError::Representation {
                        address: address.to_string(),
                        line: idx as usize + 1,
                        source,
                    })
                })
                .collect()
        })
        .await
    }

    async fn append_frame(&self, chain: &ChainRef, frame: AppendedFrame) -> Result<AppendedFrame> {
        let chain = chain.clone();
        self.blocking(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO frames (address, idx, party, representation, appended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    chain.address.as_str(),
                    frame.index as i64,
                    chain.party.as_str(),
                    encode_line(&frame),
                    now_millis(),
                ],
            );

            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    let expected: i64 = conn.query_row(
                        "SELECT COUNT(*) FROM frames WHERE address = ?1",
                        params![chain.address.as_str()],
                        |row| row.get(0),
                    )?;
                    return Err(StoreError::Conflict {
                        address: chain.address.to_string(),
                        index: frame.index,
                        expected: expected as u64,
                    });
                }
                Err(e) => return Err(e.into()),
            }

            tracing::debug!(chain = %chain, index = frame.index, "appended frame to sqlite chain");
            Ok(frame)
        })
        .await
    }

    async fn lock_chain(&self, chain: &ChainRef) -> ChainGuard {
        self.locks.lock(&chain.address).await
    }
}
