//! End-to-end request scenarios against an in-memory table source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use riukinho_core::format::GENERIC_FAILURE;
use riukinho_core::{Columns, LookupError, Outcome, Request, Responder, Table, TableSource};

/// Serves a fixed table (or a fixed failure) and counts fetches.
struct FixedSource {
    table: Option<Table>,
    fetches: AtomicUsize,
}

impl FixedSource {
    fn new(table: Table) -> Arc<Self> {
        Arc::new(Self {
            table: Some(table),
            fetches: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            table: None,
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for FixedSource {
    async fn fetch(&self) -> riukinho_core::Result<Table> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.table
            .clone()
            .ok_or_else(|| LookupError::SourceUnavailable("connection refused".into()))
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

fn responder(source: &Arc<FixedSource>) -> Responder {
    Responder::new(source.clone(), Columns::default())
}

fn orders() -> Table {
    Table::from_strings(
        ["Line", "OrderId", "Status", "RegisteredAt"],
        [
            vec!["1", "0123", "Aprovado", "2024-01-01 08:00:00"],
            vec!["2", "0200", "Pendente", "2024-01-02 08:00:00"],
            vec!["02", "0201", "Pendente", "2024-01-05 17:45:00"],
            vec!["2", "0202", "Aprovado", "2024-01-06 08:00:00"],
        ],
    )
}

#[tokio::test]
async fn test_status_found() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::Status("123".into())).await;

    assert!(reply.contains("123"));
    assert!(reply.contains("Aprovado"));
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_list_without_matches() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::List("5".into())).await;

    assert_eq!(reply, "No records for line 5.");
}

#[tokio::test]
async fn test_list_in_table_order() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::List("002".into())).await;

    assert_eq!(
        reply,
        "Orders for line 2:\n0200 - Pendente\n0201 - Pendente\n0202 - Aprovado"
    );
}

#[tokio::test]
async fn test_missing_status_column_gives_generic_reply() {
    let table = Table::from_strings(["Line", "OrderId"], [vec!["1", "1"]]);
    let source = FixedSource::new(table);
    let responder = responder(&source);

    let reply = responder.respond(&Request::Status("1".into())).await;
    assert_eq!(reply, GENERIC_FAILURE);

    match responder.evaluate(&Request::Status("1".into())).await {
        Err(LookupError::SchemaMismatch { missing }) => assert_eq!(missing, vec!["Status"]),
        other => panic!("expected schema mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_argument_never_fetches() {
    let source = FixedSource::new(orders());
    let responder = responder(&source);

    for request in [
        Request::Status(String::new()),
        Request::List("  ".into()),
        Request::Pending(String::new()),
    ] {
        let reply = responder.respond(&request).await;
        assert!(reply.starts_with("Usage: /"), "unexpected reply {:?}", reply);
    }
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_start_never_fetches() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::Start).await;

    assert!(reply.contains("/pending"));
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_pending_picks_latest() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::Pending("2".into())).await;

    assert!(reply.contains("Order: 0201"), "unexpected reply {:?}", reply);
    assert!(reply.contains("05/01/2024 17:45"));
}

#[tokio::test]
async fn test_pending_none_for_line() {
    let source = FixedSource::new(orders());
    let reply = responder(&source).respond(&Request::Pending("1".into())).await;

    assert_eq!(reply, "No pending orders for line 1.");
}

#[tokio::test]
async fn test_source_failure_gives_generic_reply() {
    let source = FixedSource::failing();
    let reply = responder(&source).respond(&Request::List("1".into())).await;

    assert_eq!(reply, GENERIC_FAILURE);
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_each_request_fetches_fresh_table() {
    let source = FixedSource::new(orders());
    let responder = responder(&source);

    responder.respond(&Request::Status("123".into())).await;
    responder.respond(&Request::Status("200".into())).await;
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_evaluate_exposes_records() {
    let source = FixedSource::new(orders());
    let outcome = responder(&source)
        .evaluate(&Request::List("2".into()))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Line { .. }));
    assert_eq!(outcome.records().len(), 3);
}
