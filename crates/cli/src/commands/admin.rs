//! Maintenance commands. These bypass the workflow entirely.

use anyhow::{Context, Result};
use tenderhub_persistence::{BidRepo, Database, TenderRepo};

use super::print_json;
use crate::AdminAction;

pub async fn handle(db: &Database, action: AdminAction) -> Result<()> {
    let mut conn = db.pool().acquire().await?;

    match action {
        AdminAction::DeleteTender { tender_id } => {
            TenderRepo::delete(&mut conn, &tender_id)
                .await
                .with_context(|| format!("Failed to delete tender {}", tender_id))?;
            tracing::info!(tender_id = %tender_id, "Tender deleted");
            print_json(&serde_json::json!({ "deleted": tender_id }))?;
        }
        AdminAction::DeleteBid { bid_id } => {
            BidRepo::delete(&mut conn, &bid_id)
                .await
                .with_context(|| format!("Failed to delete bid {}", bid_id))?;
            tracing::info!(bid_id = %bid_id, "Bid deleted");
            print_json(&serde_json::json!({ "deleted": bid_id }))?;
        }
    }

    Ok(())
}
