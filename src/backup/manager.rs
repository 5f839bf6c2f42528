//! Backup manager for the expense tracker
//!
//! A backup is a directory `backup-YYYYMMDD-HHMMSS-mmm/` under the backup
//! dir holding one CSV file per table. The header row is the table's column
//! list; values are written as SQLite stores them (amounts in cents, flags
//! as 0/1, NULL as an empty field).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::storage::schema::quote_ident;
use crate::storage::Table;

const BACKUP_PREFIX: &str = "backup-";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Metadata about a backup on disk
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Directory name
    pub name: String,
    /// Full path to the backup directory
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Tables present in the backup
    pub tables: Vec<Table>,
    /// Total size of the CSV files in bytes
    pub size_bytes: u64,
}

/// Render every table to CSV text
///
/// Callers run this inside one read transaction so the four tables are
/// mutually consistent.
pub fn dump_tables(conn: &Connection) -> TrackerResult<BTreeMap<Table, String>> {
    let mut dump = BTreeMap::new();
    for table in Table::all() {
        dump.insert(*table, dump_table(conn, *table)?);
    }
    Ok(dump)
}

fn dump_table(conn: &Connection, table: Table) -> TrackerResult<String> {
    let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table.as_str()));
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            record.push(render_value(row.get_ref(idx)?));
        }
        writer
            .write_record(&record)
            .map_err(|e| TrackerError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::Export(e.to_string()))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// Writes snapshots to and lists snapshots in the backup directory
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(backup_dir: PathBuf) -> Self {
        Self { backup_dir }
    }

    /// Write `tables` into a fresh timestamped directory
    pub fn write_snapshot(&self, tables: &BTreeMap<Table, String>) -> TrackerResult<BackupInfo> {
        let now = Utc::now();
        let name = format!(
            "{}{}-{:03}",
            BACKUP_PREFIX,
            now.format(TIMESTAMP_FORMAT),
            now.timestamp_subsec_millis()
        );
        let path = self.backup_dir.join(&name);

        fs::create_dir_all(&path)
            .map_err(|e| TrackerError::Io(format!("Failed to create backup directory: {}", e)))?;

        for (table, csv_text) in tables {
            fs::write(path.join(table.csv_file_name()), csv_text)
                .map_err(|e| TrackerError::Io(format!("Failed to write {} backup: {}", table, e)))?;
        }

        self.read_info(&path)
            .ok_or_else(|| TrackerError::Io(format!("Backup not readable: {}", path.display())))
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> TrackerResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| TrackerError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| TrackerError::Io(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(info) = self.read_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        Ok(backups)
    }

    /// Load the CSV text of every table present in a backup directory
    pub fn load(path: &Path) -> TrackerResult<BTreeMap<Table, String>> {
        let mut tables = BTreeMap::new();
        for table in Table::all() {
            let file = path.join(table.csv_file_name());
            if file.exists() {
                let text = fs::read_to_string(&file).map_err(|e| {
                    TrackerError::Io(format!("Failed to read {}: {}", file.display(), e))
                })?;
                tables.insert(*table, text);
            }
        }

        if tables.is_empty() {
            return Err(TrackerError::ImportMalformed(format!(
                "No table files found in {}",
                path.display()
            )));
        }
        Ok(tables)
    }

    fn read_info(&self, path: &Path) -> Option<BackupInfo> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let created_at = parse_backup_timestamp(name.strip_prefix(BACKUP_PREFIX)?)?;

        let mut tables = Vec::new();
        let mut size_bytes = 0;
        for table in Table::all() {
            if let Ok(meta) = fs::metadata(path.join(table.csv_file_name())) {
                tables.push(*table);
                size_bytes += meta.len();
            }
        }

        Some(BackupInfo {
            name,
            path: path.to_path_buf(),
            created_at,
            tables,
            size_bytes,
        })
    }
}

/// Parse `YYYYMMDD-HHMMSS[-mmm]`
fn parse_backup_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let base = s.get(..15)?;
    NaiveDateTime::parse_from_str(base, TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;
    use tempfile::TempDir;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    #[test]
    fn test_dump_headers_and_values() {
        let conn = conn();
        conn.execute(
            "INSERT INTO categories (id, name, type, is_default) VALUES ('c1', 'Food, Drink', 'expense', 1)",
            [],
        )
        .unwrap();

        let dump = dump_tables(&conn).unwrap();
        assert_eq!(dump.len(), 4);
        assert_eq!(
            dump[&Table::Categories],
            "id,name,type,is_default\nc1,\"Food, Drink\",expense,1\n"
        );
        assert_eq!(
            dump[&Table::Transactions],
            "id,user_id,type,amount,category,date,note,created_at\n"
        );
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(render_value(ValueRef::Null), "");
        assert_eq!(render_value(ValueRef::Integer(1250)), "1250");
    }

    #[test]
    fn test_write_list_and_load() {
        let temp = TempDir::new().unwrap();
        let manager = BackupManager::new(temp.path().to_path_buf());
        assert!(manager.list_backups().unwrap().is_empty());

        let dump = dump_tables(&conn()).unwrap();
        let info = manager.write_snapshot(&dump).unwrap();
        assert_eq!(info.tables.len(), 4);
        assert!(info.name.starts_with("backup-"));

        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, info.path);

        let loaded = BackupManager::load(&info.path).unwrap();
        assert_eq!(loaded, dump);
    }

    #[test]
    fn test_load_empty_dir_is_malformed() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            BackupManager::load(temp.path()),
            Err(TrackerError::ImportMalformed(_))
        ));
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let ts = parse_backup_timestamp("20240131-235959-042").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-31 23:59:59");
        assert!(parse_backup_timestamp("garbage").is_none());
    }
}
