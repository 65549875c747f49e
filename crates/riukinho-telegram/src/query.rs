//! One-off lookups from the command line, without Telegram.

use riukinho_core::{Outcome, Request, Responder};

use crate::error::{BotError, Result};

/// Run a single request and return what would be sent to the chat.
///
/// With `json` set, the matched records are returned as pretty JSON instead,
/// and lookup failures or a missing argument are reported as errors rather
/// than as reply text.
pub async fn run_query(responder: &Responder, request: &Request, json: bool) -> Result<String> {
    if !json {
        return Ok(responder.respond(request).await);
    }

    let outcome = responder.evaluate(request).await?;
    if let Outcome::Usage(hint) = outcome {
        return Err(BotError::Usage(hint.to_string()));
    }
    Ok(serde_json::to_string_pretty(&outcome.records())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riukinho_core::{Columns, LiveSource};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn responder_for(csv: &str) -> (Responder, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, csv).unwrap();
        let source = Arc::new(LiveSource::new(path, "Registros"));
        (Responder::new(source, Columns::default()), dir)
    }

    #[tokio::test]
    async fn test_text_query() {
        let (responder, _dir) = responder_for("Linha,OP,Status\n1,0123,Aprovado\n");
        let reply = run_query(&responder, &Request::Status("123".into()), false)
            .await
            .unwrap();
        assert_eq!(reply, "Order 0123 status: Aprovado");
    }

    #[tokio::test]
    async fn test_json_query_lists_records() {
        let (responder, _dir) = responder_for("Linha,OP,Status\n1,10,Pendente\n1,11,Aprovado\n");
        let json = run_query(&responder, &Request::List("1".into()), true)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["order_id"], "11");
    }

    #[tokio::test]
    async fn test_json_query_without_argument_is_usage_error() {
        let (responder, _dir) = responder_for("Linha,OP,Status\n1,10,Pendente\n");
        let err = run_query(&responder, &Request::Status(String::new()), true)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Usage(_)));
        assert_eq!(err.to_string(), "Usage: /status <order number>");
    }

    #[tokio::test]
    async fn test_json_query_surfaces_schema_errors() {
        let (responder, _dir) = responder_for("Linha,OP\n1,10\n");
        let result = run_query(&responder, &Request::List("1".into()), true).await;
        assert!(result.is_err());
    }
}
