//! Row lookups over a [`Table`].
//!
//! All lookups compare identifiers through [`normalize`], validate the schema
//! before scanning, and report "no match" as an empty result rather than an
//! error.

use crate::error::Result;
use crate::table::{normalize, Columns, Record, Table};

/// First record whose order id matches `raw_order_id`.
pub fn find_by_order_id(
    table: &Table,
    columns: &Columns,
    raw_order_id: &str,
) -> Result<Option<Record>> {
    let key = normalize(raw_order_id);
    Ok(table
        .records(columns, false)?
        .into_iter()
        .find(|r| normalize(&r.order_id) == key))
}

/// Every record on `raw_line`, in table order.
pub fn find_all_by_line(table: &Table, columns: &Columns, raw_line: &str) -> Result<Vec<Record>> {
    let key = normalize(raw_line);
    Ok(table
        .records(columns, false)?
        .into_iter()
        .filter(|r| normalize(&r.line) == key)
        .collect())
}

/// Most recently registered pending record on `raw_line`.
///
/// Equal timestamps resolve to the earliest row. Records without a readable
/// timestamp lose to any record that has one.
pub fn find_latest_pending_by_line(
    table: &Table,
    columns: &Columns,
    raw_line: &str,
) -> Result<Option<Record>> {
    let key = normalize(raw_line);
    let mut latest: Option<Record> = None;

    for record in table.records(columns, true)? {
        if normalize(&record.line) != key || !record.is_pending() {
            continue;
        }
        let newer = match &latest {
            None => true,
            Some(best) => record.registered_at > best.registered_at,
        };
        if newer {
            latest = Some(record);
        }
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;

    fn orders() -> Table {
        Table::from_strings(
            ["Line", "OrderId", "Status", "RegisteredAt"],
            [
                vec!["01", "0100", "Aprovado", "2024-01-01 08:00:00"],
                vec!["2", "200", "Pendente", "2024-01-02 08:00:00"],
                vec!["1", "101", "Pendente", "2024-01-03 08:00:00"],
                vec!["001", "102", "Pendente", "2024-01-02 09:00:00"],
                vec!["2", "0100", "Separado", "2024-01-04 08:00:00"],
            ],
        )
    }

    #[test]
    fn test_find_by_order_id_ignores_leading_zeros() {
        let record = find_by_order_id(&orders(), &Columns::default(), "00100").unwrap().unwrap();
        assert_eq!(record.status, "Aprovado");
    }

    #[test]
    fn test_find_by_order_id_returns_first_match() {
        let record = find_by_order_id(&orders(), &Columns::default(), "100").unwrap().unwrap();
        assert_eq!(record.line, "01");
    }

    #[test]
    fn test_find_by_order_id_no_match() {
        assert!(find_by_order_id(&orders(), &Columns::default(), "999").unwrap().is_none());
    }

    #[test]
    fn test_find_all_by_line_preserves_order() {
        let records = find_all_by_line(&orders(), &Columns::default(), "1").unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["0100", "101", "102"]);
        assert!(records.iter().all(|r| normalize(&r.line) == "1"));
    }

    #[test]
    fn test_find_all_by_line_no_match() {
        assert!(find_all_by_line(&orders(), &Columns::default(), "5").unwrap().is_empty());
    }

    #[test]
    fn test_latest_pending_picks_latest_timestamp() {
        let record = find_latest_pending_by_line(&orders(), &Columns::default(), "1")
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, "101");
    }

    #[test]
    fn test_latest_pending_skips_other_statuses() {
        // line 2 has a later non-pending record
        let record = find_latest_pending_by_line(&orders(), &Columns::default(), "2")
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, "200");
        assert!(record.is_pending());
    }

    #[test]
    fn test_latest_pending_tie_keeps_first() {
        let table = Table::from_strings(
            ["Line", "OrderId", "Status", "RegisteredAt"],
            [
                vec!["3", "1", "Pendente", "2024-01-01 08:00:00"],
                vec!["3", "2", "Pendente", "2024-01-01 08:00:00"],
            ],
        );
        let record = find_latest_pending_by_line(&table, &Columns::default(), "3")
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, "1");
    }

    #[test]
    fn test_latest_pending_prefers_timestamped_records() {
        let table = Table::from_strings(
            ["Line", "OrderId", "Status", "RegisteredAt"],
            [
                vec!["3", "1", "Pendente", ""],
                vec!["3", "2", "Pendente", "2020-01-01"],
                vec!["3", "3", "Pendente", "not a date"],
            ],
        );
        let record = find_latest_pending_by_line(&table, &Columns::default(), "3")
            .unwrap()
            .unwrap();
        assert_eq!(record.order_id, "2");
    }

    #[test]
    fn test_latest_pending_requires_timestamp_column() {
        let table =
            Table::from_strings(["Line", "OrderId", "Status"], [vec!["1", "1", "Pendente"]]);
        let err = find_latest_pending_by_line(&table, &Columns::default(), "1").unwrap_err();
        assert!(matches!(err, LookupError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_schema_checked_before_scan_even_when_empty() {
        let table = Table::from_strings(["Line", "OrderId"], Vec::<Vec<&str>>::new());
        assert!(matches!(
            find_by_order_id(&table, &Columns::default(), "1"),
            Err(LookupError::SchemaMismatch { .. })
        ));
    }
}
