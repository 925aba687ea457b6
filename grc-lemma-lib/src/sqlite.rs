// SQLite-backed lemma map and dictionary over the `lemma_map` and
// `dictionary_entries` tables.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::errors::{LemmaError, Result};
use crate::normalize::{normalize, normalize_language};
use crate::store::{DictionaryStore, LemmaStore};
use crate::types::{DictionaryEntry, LemmaMapping};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lemma_map (
    word_form TEXT NOT NULL,
    word_normalized TEXT NOT NULL,
    lemma TEXT NOT NULL,
    confidence REAL DEFAULT 1.0,
    source TEXT,
    morph_info TEXT,
    PRIMARY KEY (word_form, lemma)
);
CREATE INDEX IF NOT EXISTS idx_lemma_map_normalized ON lemma_map (word_normalized);

CREATE TABLE IF NOT EXISTS dictionary_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    headword TEXT NOT NULL,
    headword_normalized TEXT NOT NULL,
    language TEXT NOT NULL CHECK (language IN ('greek', 'latin')),
    entry_xml TEXT,
    entry_html TEXT,
    entry_plain TEXT,
    source TEXT
);
CREATE INDEX IF NOT EXISTS idx_dictionary_headword
    ON dictionary_entries (headword_normalized, language);
";

const SELECT_MAPPINGS: &str = "
SELECT word_form, word_normalized, lemma, confidence, source, morph_info
FROM lemma_map
WHERE word_form = ?1 OR word_normalized = ?1
ORDER BY confidence DESC, rowid";

const SELECT_ENTRY: &str = "
SELECT headword, headword_normalized, language, entry_xml, entry_html, entry_plain, source
FROM dictionary_entries
WHERE headword_normalized = ?1 AND language = ?2
ORDER BY id
LIMIT 1";

const SEARCH_ENTRIES: &str = "
SELECT headword, headword_normalized, language, entry_xml, entry_html, entry_plain, source
FROM dictionary_entries
WHERE headword_normalized LIKE ?1 ESCAPE '\\' AND language = ?2
ORDER BY headword_normalized, id
LIMIT ?3";

/// Both stores over one SQLite connection.
///
/// The connection sits behind a mutex so a single store can be shared by
/// concurrent resolvers.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open an existing database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;
        Ok(Self::from_connection(conn))
    }

    /// Open (or create) a database read-write and make sure the schema exists.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(unavailable)?;
        let store = Self::from_connection(conn);
        store.create_schema()?;
        Ok(store)
    }

    /// A fresh in-memory database with the schema in place.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        let store = Self::from_connection(conn);
        store.create_schema()?;
        Ok(store)
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn create_schema(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA).map_err(unavailable)
    }

    /// Insert or replace a lemma mapping. A missing `word_normalized` is
    /// computed from the word form.
    pub fn insert_mapping(&self, mapping: &LemmaMapping) -> Result<()> {
        let normalized = if mapping.word_normalized.is_empty() {
            normalize(&mapping.word_form)
        } else {
            normalize(&mapping.word_normalized)
        };
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO lemma_map
                 (word_form, word_normalized, lemma, confidence, source, morph_info)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    mapping.word_form,
                    normalized,
                    mapping.lemma,
                    mapping.confidence,
                    mapping.source,
                    mapping.morph_info,
                ],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    /// Insert a dictionary entry. A missing `headword_normalized` is computed
    /// from the headword.
    pub fn insert_entry(&self, entry: &DictionaryEntry) -> Result<()> {
        let normalized = if entry.headword_normalized.is_empty() {
            normalize(&entry.headword)
        } else {
            normalize(&entry.headword_normalized)
        };
        self.lock()?
            .execute(
                "INSERT INTO dictionary_entries
                 (headword, headword_normalized, language, entry_xml, entry_html, entry_plain, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.headword,
                    normalized,
                    normalize_language(&entry.language),
                    entry.entry_xml,
                    entry.entry_html,
                    entry.entry_plain,
                    entry.source,
                ],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LemmaError::store_unavailable("sqlite", "connection mutex poisoned"))
    }
}

fn unavailable(e: rusqlite::Error) -> LemmaError {
    LemmaError::store_unavailable("sqlite", e)
}

fn mapping_from_row(row: &Row<'_>) -> rusqlite::Result<LemmaMapping> {
    Ok(LemmaMapping {
        word_form: row.get(0)?,
        word_normalized: row.get(1)?,
        lemma: row.get(2)?,
        confidence: row.get(3)?,
        source: row.get(4)?,
        morph_info: row.get(5)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<DictionaryEntry> {
    Ok(DictionaryEntry {
        headword: row.get(0)?,
        headword_normalized: row.get(1)?,
        language: row.get(2)?,
        entry_xml: row.get(3)?,
        entry_html: row.get(4)?,
        entry_plain: row.get(5)?,
        source: row.get(6)?,
    })
}

impl LemmaStore for SqliteStore {
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_MAPPINGS).map_err(unavailable)?;
        let rows = stmt
            .query_map(params![normalized], mapping_from_row)
            .map_err(unavailable)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)
    }
}

impl DictionaryStore for SqliteStore {
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_ENTRY).map_err(unavailable)?;
        stmt.query_row(params![normalized_headword, language], entry_from_row)
            .optional()
            .map_err(unavailable)
    }

    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SEARCH_ENTRIES).map_err(unavailable)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![pattern, language, limit], entry_from_row)
            .map_err(unavailable)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)
    }
}
