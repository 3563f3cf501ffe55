use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::events::Command;

/// Parse one console line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Result<Command, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Spawns a task that reads JSON commands from stdin, one per line
pub fn spawn(tx: mpsc::Sender<Command>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        info!("[console] Reading commands from stdin");

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    Some(Ok(command)) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => warn!("[console] Ignoring {:?}: {}", line, e),
                    None => {}
                },
                Ok(None) => {
                    info!("[console] stdin closed");
                    break;
                }
                Err(e) => {
                    warn!("[console] Read error: {}", e);
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   # bump the clock").is_none());
        assert!(matches!(
            parse_line(r#" {"action": "handle_listing_end", "listing_id": 3} "#),
            Some(Ok(Command::HandleListingEnd { listing_id: 3 }))
        ));
        assert!(matches!(parse_line("not json"), Some(Err(_))));
    }
}
