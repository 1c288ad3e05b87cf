//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod migrations;
mod postgres_audit_repository;
mod postgres_organization_repository;
mod postgres_rbac_repository;
mod postgres_user_directory;

pub use migrations::{MIGRATOR, run_migrations};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_organization_repository::PostgresOrganizationRepository;
pub use postgres_rbac_repository::PostgresRbacRepository;
pub use postgres_user_directory::PostgresUserDirectory;
