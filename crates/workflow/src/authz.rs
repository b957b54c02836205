//! Identity and permission questions asked by every workflow operation.
//! All functions are read-only.

use crate::error::{WorkflowError, WorkflowResult};
use sqlx::SqliteConnection;
use tenderhub_core::{AuthorType, Bid, Organization, User};
use tenderhub_persistence::{MembershipRepo, OrganizationRepo, UserRepo};

pub struct AuthorizationResolver;

impl AuthorizationResolver {
    /// Look up a user by username; unknown names are `InvalidUser`
    pub async fn resolve_user(conn: &mut SqliteConnection, username: &str) -> WorkflowResult<User> {
        UserRepo::get_by_username(conn, username)
            .await?
            .ok_or_else(|| WorkflowError::invalid_user(username))
    }

    pub async fn resolve_user_id(conn: &mut SqliteConnection, user_id: &str) -> WorkflowResult<User> {
        UserRepo::get_by_id(conn, user_id)
            .await?
            .ok_or_else(|| WorkflowError::invalid_user(user_id))
    }

    pub async fn resolve_organization(
        conn: &mut SqliteConnection,
        organization_id: &str,
    ) -> WorkflowResult<Organization> {
        OrganizationRepo::get_by_id(conn, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::invalid_user(organization_id))
    }

    pub async fn is_member(
        conn: &mut SqliteConnection,
        user_id: &str,
        organization_id: &str,
    ) -> WorkflowResult<bool> {
        Ok(MembershipRepo::is_member(conn, user_id, organization_id).await?)
    }

    /// First organization the user joined, if any
    pub async fn organization_of(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> WorkflowResult<Option<String>> {
        Ok(MembershipRepo::first_organization_of(conn, user_id).await?)
    }

    pub async fn are_colleagues(
        conn: &mut SqliteConnection,
        user_id_1: &str,
        user_id_2: &str,
    ) -> WorkflowResult<bool> {
        Ok(MembershipRepo::are_colleagues(conn, user_id_1, user_id_2).await?)
    }

    /// Edit rights on a bid: its author, a member of the authoring
    /// organization, or a colleague of the authoring user.
    pub async fn can_edit(conn: &mut SqliteConnection, user: &User, bid: &Bid) -> WorkflowResult<bool> {
        if user.id == bid.author_id {
            return Ok(true);
        }
        match bid.author_type {
            AuthorType::Organization => Self::is_member(conn, &user.id, &bid.author_id).await,
            AuthorType::User => Self::are_colleagues(conn, &user.id, &bid.author_id).await,
        }
    }
}
