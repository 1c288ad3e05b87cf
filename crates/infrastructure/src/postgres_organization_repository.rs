use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use agrinova_application::{AssignmentRepository, OrganizationRepository};
use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{Block, BlockId, Company, CompanyId, Division, DivisionId, Estate, EstateId};


/// PostgreSQL-backed reads over the company, estate, division and block
/// tables and the user assignment tables.
#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, query: &'static str, user_id: UserId, target: uuid::Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(query)
            .bind(user_id.as_uuid())
            .bind(target)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to check assignment of user {user_id}: {error}"
                ))
            })
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: uuid::Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct EstateRow {
    id: uuid::Uuid,
    company_id: uuid::Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct DivisionRow {
    id: uuid::Uuid,
    estate_id: uuid::Uuid,
    company_id: Option<uuid::Uuid>,
    name: String,
}

#[derive(Debug, FromRow)]
struct BlockRow {
    id: uuid::Uuid,
    division_id: uuid::Uuid,
    name: String,
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn find_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>("SELECT id, name FROM companies WHERE id = $1")
            .bind(company_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find company: {error}")))?;

        Ok(row.map(|row| Company {
            id: CompanyId::from_uuid(row.id),
            name: row.name,
        }))
    }

    async fn find_estate(&self, estate_id: EstateId) -> AppResult<Option<Estate>> {
        let row = sqlx::query_as::<_, EstateRow>(
            "SELECT id, company_id, name FROM estates WHERE id = $1",
        )
        .bind(estate_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find estate: {error}")))?;

        Ok(row.map(|row| Estate {
            id: EstateId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            name: row.name,
        }))
    }

    async fn find_division(&self, division_id: DivisionId) -> AppResult<Option<Division>> {
        let row = sqlx::query_as::<_, DivisionRow>(
            "SELECT id, estate_id, company_id, name FROM divisions WHERE id = $1",
        )
        .bind(division_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find division: {error}")))?;

        Ok(row.map(|row| Division {
            id: DivisionId::from_uuid(row.id),
            estate_id: EstateId::from_uuid(row.estate_id),
            company_id: row.company_id.map(CompanyId::from_uuid),
            name: row.name,
        }))
    }

    async fn find_block(&self, block_id: BlockId) -> AppResult<Option<Block>> {
        let row = sqlx::query_as::<_, BlockRow>(
            "SELECT id, division_id, name FROM blocks WHERE id = $1",
        )
        .bind(block_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find block: {error}")))?;

        Ok(row.map(|row| Block {
            id: BlockId::from_uuid(row.id),
            division_id: DivisionId::from_uuid(row.division_id),
            name: row.name,
        }))
    }
}

#[async_trait]
impl AssignmentRepository for PostgresOrganizationRepository {
    async fn has_company_assignment(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        self.exists(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_company_assignments
                WHERE user_id = $1 AND company_id = $2
            )
            "#,
            user_id,
            company_id.as_uuid(),
        )
        .await
    }

    async fn has_active_estate_assignment(
        &self,
        user_id: UserId,
        estate_id: EstateId,
    ) -> AppResult<bool> {
        self.exists(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_estate_assignments
                WHERE user_id = $1 AND estate_id = $2 AND is_active
            )
            "#,
            user_id,
            estate_id.as_uuid(),
        )
        .await
    }

    async fn has_active_division_assignment(
        &self,
        user_id: UserId,
        division_id: DivisionId,
    ) -> AppResult<bool> {
        self.exists(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_division_assignments
                WHERE user_id = $1 AND division_id = $2 AND is_active
            )
            "#,
            user_id,
            division_id.as_uuid(),
        )
        .await
    }
}
