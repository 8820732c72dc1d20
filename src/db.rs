use anyhow::Result;
use rusqlite::Connection;

use crate::model::{
    Action, ActionDate, DocumentLink, LegislativeRecord, RecordKind, Source, Sponsorship,
};

const DB_PATH: &str = "data/gu.sqlite";

pub fn connect() -> Result<Connection> {
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS records (
            id         INTEGER PRIMARY KEY,
            identifier TEXT NOT NULL,
            session    TEXT NOT NULL,
            chamber    TEXT NOT NULL,
            kind       TEXT NOT NULL CHECK(kind IN ('bill','resolution')),
            title      TEXT NOT NULL,
            withdrawn  BOOLEAN NOT NULL DEFAULT 0,
            scraped_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(session, kind, identifier)
        );

        CREATE TABLE IF NOT EXISTS actions (
            id           INTEGER PRIMARY KEY,
            record_id    INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
            seq          INTEGER NOT NULL,
            label        TEXT NOT NULL,
            -- RFC 3339 for structured dates, the raw source text otherwise
            date_text    TEXT NOT NULL,
            organization TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_actions_record ON actions(record_id);

        CREATE TABLE IF NOT EXISTS sponsorships (
            id             INTEGER PRIMARY KEY,
            record_id      INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
            seq            INTEGER NOT NULL,
            name           TEXT NOT NULL,
            entity_type    TEXT NOT NULL,
            classification TEXT NOT NULL CHECK(classification IN ('primary','cosponsor')),
            is_primary     BOOLEAN NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sponsorships_record ON sponsorships(record_id);

        CREATE TABLE IF NOT EXISTS document_links (
            id        INTEGER PRIMARY KEY,
            record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
            seq       INTEGER NOT NULL,
            url       TEXT NOT NULL,
            note      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_document_links_record ON document_links(record_id);

        CREATE TABLE IF NOT EXISTS sources (
            id        INTEGER PRIMARY KEY,
            record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
            seq       INTEGER NOT NULL,
            url       TEXT NOT NULL,
            note      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sources_record ON sources(record_id);
        ",
    )?;
    Ok(())
}

/// Replace each record (and its children) keyed by (session, kind,
/// identifier). Re-scraping a session is idempotent.
pub fn save_records(conn: &Connection, records: &[LegislativeRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut delete = tx.prepare(
            "DELETE FROM records WHERE session = ?1 AND kind = ?2 AND identifier = ?3",
        )?;
        let mut insert = tx.prepare(
            "INSERT INTO records (identifier, session, chamber, kind, title, withdrawn)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut action = tx.prepare(
            "INSERT INTO actions (record_id, seq, label, date_text, organization)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut sponsorship = tx.prepare(
            "INSERT INTO sponsorships (record_id, seq, name, entity_type, classification, is_primary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut document_link = tx.prepare(
            "INSERT INTO document_links (record_id, seq, url, note) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut source = tx.prepare(
            "INSERT INTO sources (record_id, seq, url, note) VALUES (?1, ?2, ?3, ?4)",
        )?;

        for rec in records {
            delete.execute(rusqlite::params![rec.session, rec.kind.as_str(), rec.identifier])?;
            insert.execute(rusqlite::params![
                rec.identifier,
                rec.session,
                rec.chamber,
                rec.kind.as_str(),
                rec.title,
                rec.withdrawn,
            ])?;
            let record_id = tx.last_insert_rowid();

            for (seq, a) in rec.actions.iter().enumerate() {
                action.execute(rusqlite::params![
                    record_id,
                    seq as i64,
                    a.label,
                    a.date.to_db_string(),
                    a.organization,
                ])?;
            }
            for (seq, s) in rec.sponsorships.iter().enumerate() {
                sponsorship.execute(rusqlite::params![
                    record_id,
                    seq as i64,
                    s.name,
                    s.entity_type,
                    s.classification,
                    s.primary,
                ])?;
            }
            for (seq, d) in rec.document_links.iter().enumerate() {
                document_link.execute(rusqlite::params![record_id, seq as i64, d.url, d.note])?;
            }
            for (seq, s) in rec.sources.iter().enumerate() {
                source.execute(rusqlite::params![record_id, seq as i64, s.url, s.note])?;
            }
            count += 1;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Rebuild full records from the database, oldest scrape first, for export.
pub fn fetch_records(conn: &Connection, session: Option<&str>) -> Result<Vec<LegislativeRecord>> {
    let sql = format!(
        "SELECT id, identifier, session, chamber, kind, title, withdrawn
         FROM records{} ORDER BY id",
        match session {
            Some(_) => " WHERE session = ?1",
            None => "",
        }
    );
    let mut stmt = conn.prepare(&sql)?;

    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(i64, LegislativeRecord)> {
        let kind: String = row.get(4)?;
        Ok((
            row.get(0)?,
            LegislativeRecord {
                identifier: row.get(1)?,
                session: row.get(2)?,
                chamber: row.get(3)?,
                kind: if kind == "bill" {
                    RecordKind::Bill
                } else {
                    RecordKind::Resolution
                },
                title: row.get(5)?,
                withdrawn: row.get(6)?,
                sources: Vec::new(),
                actions: Vec::new(),
                sponsorships: Vec::new(),
                document_links: Vec::new(),
            },
        ))
    };
    let rows: Vec<(i64, LegislativeRecord)> = match session {
        Some(s) => stmt
            .query_map([s], map_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
    };

    let mut records = Vec::with_capacity(rows.len());
    for (id, mut rec) in rows {
        rec.actions = fetch_actions(conn, id)?;
        rec.sponsorships = fetch_sponsorships(conn, id)?;
        rec.document_links = fetch_document_links(conn, id)?;
        rec.sources = fetch_sources(conn, id)?;
        records.push(rec);
    }
    Ok(records)
}

fn fetch_actions(conn: &Connection, record_id: i64) -> Result<Vec<Action>> {
    let mut stmt = conn.prepare(
        "SELECT label, date_text, organization FROM actions WHERE record_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([record_id], |row| {
            let label: String = row.get(0)?;
            let date_text: String = row.get(1)?;
            let organization: Option<String> = row.get(2)?;
            Ok((label, date_text, organization))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .map(|(label, date_text, organization)| Action {
            label,
            date: match chrono::DateTime::parse_from_rfc3339(&date_text) {
                Ok(dt) => ActionDate::When(dt),
                Err(_) => ActionDate::Text(date_text),
            },
            organization,
        })
        .collect())
}

fn fetch_sponsorships(conn: &Connection, record_id: i64) -> Result<Vec<Sponsorship>> {
    let mut stmt = conn.prepare(
        "SELECT name, entity_type, classification, is_primary
         FROM sponsorships WHERE record_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([record_id], |row| {
            Ok(Sponsorship {
                name: row.get(0)?,
                entity_type: row.get(1)?,
                classification: row.get(2)?,
                primary: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn fetch_document_links(conn: &Connection, record_id: i64) -> Result<Vec<DocumentLink>> {
    let mut stmt = conn
        .prepare("SELECT url, note FROM document_links WHERE record_id = ?1 ORDER BY seq")?;
    let rows = stmt
        .query_map([record_id], |row| {
            Ok(DocumentLink {
                url: row.get(0)?,
                note: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn fetch_sources(conn: &Connection, record_id: i64) -> Result<Vec<Source>> {
    let mut stmt =
        conn.prepare("SELECT url, note FROM sources WHERE record_id = ?1 ORDER BY seq")?;
    let rows = stmt
        .query_map([record_id], |row| {
            Ok(Source {
                url: row.get(0)?,
                note: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Overview ──

pub struct OverviewRow {
    pub identifier: String,
    pub session: String,
    pub kind: String,
    pub title: String,
    pub withdrawn: bool,
    pub sponsor_count: i64,
    pub action_count: i64,
}

pub fn fetch_overview(
    conn: &Connection,
    session: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT r.identifier, r.session, r.kind, r.title, r.withdrawn,
                (SELECT COUNT(*) FROM sponsorships s WHERE s.record_id = r.id),
                (SELECT COUNT(*) FROM actions a WHERE a.record_id = r.id)
         FROM records r{}
         ORDER BY r.session DESC, r.kind, r.id
         LIMIT {limit}",
        match session {
            Some(_) => " WHERE r.session = ?1",
            None => "",
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<OverviewRow> {
        Ok(OverviewRow {
            identifier: row.get(0)?,
            session: row.get(1)?,
            kind: row.get(2)?,
            title: row.get(3)?,
            withdrawn: row.get(4)?,
            sponsor_count: row.get(5)?,
            action_count: row.get(6)?,
        })
    };
    let rows = match session {
        Some(s) => stmt
            .query_map([s], map_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub records: usize,
    pub bills: usize,
    pub resolutions: usize,
    pub withdrawn: usize,
    pub actions: usize,
    pub sponsorships: usize,
    pub document_links: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let records: usize = conn.query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))?;
    let bills: usize = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE kind = 'bill'",
        [],
        |r| r.get(0),
    )?;
    let withdrawn: usize = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE withdrawn = 1",
        [],
        |r| r.get(0),
    )?;
    let actions: usize = conn.query_row("SELECT COUNT(*) FROM actions", [], |r| r.get(0))?;
    let sponsorships: usize =
        conn.query_row("SELECT COUNT(*) FROM sponsorships", [], |r| r.get(0))?;
    let document_links: usize =
        conn.query_row("SELECT COUNT(*) FROM document_links", [], |r| r.get(0))?;
    Ok(Stats {
        records,
        bills,
        resolutions: records - bills,
        withdrawn,
        actions,
        sponsorships,
        document_links,
    })
}
