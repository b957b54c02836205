//! Directory seeding: users, organizations, memberships

use anyhow::{bail, Context, Result};
use tenderhub_core::{Organization, User};
use tenderhub_persistence::{Database, MembershipRepo, OrganizationRepo, UserRepo};
use uuid::Uuid;

use super::print_json;
use crate::{OrgAction, UserAction};

/// Handle user subcommands
pub async fn handle_user(db: &Database, action: UserAction) -> Result<()> {
    let mut conn = db.pool().acquire().await?;

    match action {
        UserAction::Add {
            username,
            id,
            first_name,
            last_name,
        } => {
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let mut user = User::new(&id, &username);
            user.first_name = first_name;
            user.last_name = last_name;

            UserRepo::insert(&mut conn, &user)
                .await
                .with_context(|| format!("Failed to add user {}", username))?;
            tracing::info!(user_id = %user.id, username = %user.username, "User added");
            print_json(&user)?;
        }
        UserAction::List => {
            print_json(&UserRepo::get_all(&mut conn).await?)?;
        }
    }

    Ok(())
}

/// Handle organization subcommands
pub async fn handle_org(db: &Database, action: OrgAction) -> Result<()> {
    let mut conn = db.pool().acquire().await?;

    match action {
        OrgAction::Add {
            name,
            r#type,
            id,
            description,
        } => {
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let mut org = Organization::new(&id, &name, r#type.to_core_type());
            org.description = description;

            OrganizationRepo::insert(&mut conn, &org)
                .await
                .with_context(|| format!("Failed to add organization {}", name))?;
            tracing::info!(organization_id = %org.id, "Organization added");
            print_json(&org)?;
        }
        OrgAction::AddMember { org_id, username } => {
            let Some(user) = UserRepo::get_by_username(&mut conn, &username).await? else {
                bail!("Unknown user: {}", username);
            };
            if OrganizationRepo::get_by_id(&mut conn, &org_id).await?.is_none() {
                bail!("Unknown organization: {}", org_id);
            }

            MembershipRepo::add_member(&mut conn, &org_id, &user.id)
                .await
                .with_context(|| format!("Failed to add {} to {}", username, org_id))?;
            let employees = MembershipRepo::employee_count(&mut conn, &org_id).await?;
            tracing::info!(organization_id = %org_id, user_id = %user.id, employees, "Member added");
            print_json(&serde_json::json!({
                "organizationId": org_id,
                "userId": user.id,
                "employees": employees,
            }))?;
        }
    }

    Ok(())
}
