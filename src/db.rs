use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};

/// Candidate years checked by the post-run summary.
pub const SUMMARY_YEARS: RangeInclusive<i32> = 2014..=2024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub companies: u64,
}

pub fn connect_read_only(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open {:?}", path))?;
    Ok(conn)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Row count of `companies_<year>`; a year whose table was never created counts as 0.
pub fn count_companies(conn: &Connection, year: i32) -> Result<u64> {
    let table = format!("companies_{}", year);
    if !table_exists(conn, &table)? {
        return Ok(0);
    }
    let n: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .with_context(|| format!("Failed to count {}", table))?;
    Ok(n.max(0) as u64)
}

/// Years with at least one company row, in ascending order.
pub fn year_counts(
    conn: &Connection,
    years: impl IntoIterator<Item = i32>,
) -> Result<Vec<YearCount>> {
    let mut counts = Vec::new();
    for year in years {
        let companies = count_companies(conn, year)?;
        if companies > 0 {
            counts.push(YearCount { year, companies });
        }
    }
    Ok(counts)
}

/// Opens the database just long enough to count each summary year.
/// A database file that was never created has no rows for any year.
pub fn summarize(path: &Path) -> Result<Vec<YearCount>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let conn = connect_read_only(path)?;
    year_counts(&conn, SUMMARY_YEARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(conn: &Connection, year: i32, tickers: &[&str]) {
        conn.execute_batch(&format!(
            "CREATE TABLE companies_{year} (
                ticker       TEXT PRIMARY KEY,
                cik          TEXT,
                company_name TEXT
            );"
        ))
        .unwrap();
        for t in tickers {
            conn.execute(
                &format!("INSERT INTO companies_{year} (ticker, company_name) VALUES (?1, ?1)"),
                [t],
            )
            .unwrap();
        }
    }

    #[test]
    fn missing_table_counts_as_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(count_companies(&conn, 2019).unwrap(), 0);
    }

    #[test]
    fn empty_years_are_omitted() {
        let conn = Connection::open_in_memory().unwrap();
        seed(&conn, 2020, &["AAPL", "MSFT", "KO"]);
        seed(&conn, 2021, &[]);
        seed(&conn, 2023, &["IBM"]);

        let counts = year_counts(&conn, SUMMARY_YEARS).unwrap();
        assert_eq!(
            counts,
            vec![
                YearCount { year: 2020, companies: 3 },
                YearCount { year: 2023, companies: 1 },
            ]
        );
    }

    #[test]
    fn years_outside_the_range_are_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        seed(&conn, 2005, &["GE"]);
        assert!(year_counts(&conn, SUMMARY_YEARS).unwrap().is_empty());
    }

    #[test]
    fn summarize_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.db");
        {
            let conn = Connection::open(&path).unwrap();
            seed(&conn, 2024, &["NVDA", "AMD"]);
        }
        let counts = summarize(&path).unwrap();
        assert_eq!(counts, vec![YearCount { year: 2024, companies: 2 }]);
    }

    #[test]
    fn summarize_missing_file_has_no_years() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        assert!(summarize(&path).unwrap().is_empty());
        // the summary never creates the database
        assert!(!path.exists());
    }

    #[test]
    fn summarize_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, b"this is not a sqlite database, just some text padding it out").unwrap();
        assert!(summarize(&path).is_err());
    }

    #[test]
    fn summary_range_is_eleven_years() {
        assert_eq!(SUMMARY_YEARS.count(), 11);
    }
}
