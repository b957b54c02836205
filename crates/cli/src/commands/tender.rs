//! Tender commands

use anyhow::Result;
use tenderhub_core::{TenderDraft, TenderPatch};
use tenderhub_persistence::Database;
use tenderhub_workflow::ServiceContext;

use super::print_json;
use crate::TenderAction;

/// Handle tender subcommands
pub async fn handle(db: &Database, action: TenderAction) -> Result<()> {
    let ctx = ServiceContext::new(db);
    let tenders = ctx.tenders();

    match action {
        TenderAction::Create {
            username,
            org,
            service_type,
            name,
            description,
        } => {
            let draft = TenderDraft::new(&org, service_type.to_core_type(), &name)
                .with_description(&description);
            print_json(&tenders.create(&username, draft).await?)?;
        }
        TenderAction::List { service_type, page } => {
            let types: Vec<_> = service_type.iter().map(|t| t.to_core_type()).collect();
            print_json(&tenders.list(&types, page.to_pagination()).await?)?;
        }
        TenderAction::Mine { username, page } => {
            print_json(&tenders.list_mine(&username, page.to_pagination()).await?)?;
        }
        TenderAction::Status {
            username,
            tender_id,
        } => {
            print_json(&tenders.get_status(&username, &tender_id).await?)?;
        }
        TenderAction::SetStatus {
            username,
            tender_id,
            status,
        } => {
            let tender = tenders
                .set_status(&username, &tender_id, status.to_core_type())
                .await?;
            print_json(&tender)?;
        }
        TenderAction::Edit {
            username,
            tender_id,
            name,
            description,
            service_type,
        } => {
            let patch = TenderPatch {
                name,
                description,
                service_type: service_type.map(|t| t.to_core_type()),
            };
            print_json(&tenders.edit(&username, &tender_id, &patch).await?)?;
        }
        TenderAction::Rollback {
            username,
            tender_id,
            target_version,
        } => {
            print_json(&tenders.rollback(&username, &tender_id, target_version).await?)?;
        }
        TenderAction::Versions {
            username,
            tender_id,
            at_version,
        } => {
            print_json(&tenders.versions(&username, &tender_id, at_version).await?)?;
        }
    }

    Ok(())
}
