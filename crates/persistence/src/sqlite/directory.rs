//! Directory repositories: users, organizations, memberships.
//!
//! Answers the identity questions every workflow operation asks. Seeding
//! functions (`insert`, `add_member`) are maintenance operations used by
//! the CLI and tests; the workflow only reads.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{OrganizationRow, UserRow};
use sqlx::SqliteConnection;
use tenderhub_core::{Organization, User};

// ============================================================================
// User Repository
// ============================================================================

/// Repository for table `users`
pub struct UserRepo;

impl UserRepo {
    pub async fn get_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> PersistenceResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(User::from))
    }

    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(User::from))
    }

    pub async fn insert(conn: &mut SqliteConnection, user: &User) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, first_name, last_name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| PersistenceError::from_insert(e, "User", &user.username))?;
        Ok(())
    }

    pub async fn get_all(conn: &mut SqliteConnection) -> PersistenceResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY username")
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Organization Repository
// ============================================================================

/// Repository for table `organizations`
pub struct OrganizationRepo;

impl OrganizationRepo {
    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(Organization::try_from).transpose()
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        organization: &Organization,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO organizations (id, name, description, org_type, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&organization.id)
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.org_type.as_str())
        .bind(organization.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| PersistenceError::from_insert(e, "Organization", &organization.id))?;
        Ok(())
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM organizations")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Membership Repository
// ============================================================================

/// Repository for table `organization_members`
pub struct MembershipRepo;

impl MembershipRepo {
    pub async fn add_member(
        conn: &mut SqliteConnection,
        organization_id: &str,
        user_id: &str,
    ) -> PersistenceResult<()> {
        sqlx::query("INSERT INTO organization_members (organization_id, user_id) VALUES (?, ?)")
            .bind(organization_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                PersistenceError::from_insert(
                    e,
                    "Membership",
                    &format!("{}:{}", organization_id, user_id),
                )
            })?;
        Ok(())
    }

    /// True iff `user_id` is a recorded member of `organization_id`
    pub async fn is_member(
        conn: &mut SqliteConnection,
        user_id: &str,
        organization_id: &str,
    ) -> PersistenceResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM organization_members WHERE organization_id = ? AND user_id = ? LIMIT 1",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.is_some())
    }

    /// The user's first organization, by membership insertion order
    pub async fn first_organization_of(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> PersistenceResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT organization_id FROM organization_members WHERE user_id = ? ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn employee_count(
        conn: &mut SqliteConnection,
        organization_id: &str,
    ) -> PersistenceResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM organization_members WHERE organization_id = ?")
                .bind(organization_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(row.0)
    }

    /// True iff both users appear under at least one common organization
    pub async fn are_colleagues(
        conn: &mut SqliteConnection,
        user_id_1: &str,
        user_id_2: &str,
    ) -> PersistenceResult<bool> {
        let shared: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT organization_id, COUNT(DISTINCT user_id) AS members
            FROM organization_members
            WHERE user_id IN (?, ?)
            GROUP BY organization_id
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .fetch_all(&mut *conn)
        .await?;
        Ok(shared.iter().any(|(_, members)| *members >= 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::memory_pool;
    use tenderhub_core::OrganizationType;

    #[tokio::test]
    async fn test_membership_queries() {
        let pool = memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        for (id, name) in [("u-1", "alice"), ("u-2", "bob"), ("u-3", "carol")] {
            UserRepo::insert(&mut conn, &User::new(id, name)).await.unwrap();
        }
        for (id, name) in [("org-1", "Acme"), ("org-2", "Globex")] {
            OrganizationRepo::insert(&mut conn, &Organization::new(id, name, OrganizationType::Jsc))
                .await
                .unwrap();
        }
        MembershipRepo::add_member(&mut conn, "org-2", "u-1").await.unwrap();
        MembershipRepo::add_member(&mut conn, "org-1", "u-1").await.unwrap();
        MembershipRepo::add_member(&mut conn, "org-1", "u-2").await.unwrap();

        assert!(MembershipRepo::is_member(&mut conn, "u-1", "org-1").await.unwrap());
        assert!(!MembershipRepo::is_member(&mut conn, "u-3", "org-1").await.unwrap());

        // insertion order, not id order
        assert_eq!(
            MembershipRepo::first_organization_of(&mut conn, "u-1").await.unwrap().as_deref(),
            Some("org-2")
        );
        assert!(MembershipRepo::first_organization_of(&mut conn, "u-3").await.unwrap().is_none());

        assert_eq!(MembershipRepo::employee_count(&mut conn, "org-1").await.unwrap(), 2);
        assert!(MembershipRepo::are_colleagues(&mut conn, "u-1", "u-2").await.unwrap());
        assert!(!MembershipRepo::are_colleagues(&mut conn, "u-2", "u-3").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        UserRepo::insert(&mut conn, &User::new("u-1", "alice")).await.unwrap();

        let err = UserRepo::insert(&mut conn, &User::new("u-2", "alice")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::AlreadyExists { .. }));

        let found = UserRepo::get_by_username(&mut conn, "alice").await.unwrap().unwrap();
        assert_eq!(found.id, "u-1");
        assert_eq!(UserRepo::count(&mut conn).await.unwrap(), 1);
    }
}
