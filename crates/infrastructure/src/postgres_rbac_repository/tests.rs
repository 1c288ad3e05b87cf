use agrinova_application::{
    CreatePermissionInput, CreateRoleInput, NewUserOverride, OverrideRemoval,
    PermissionRepository, RbacStatisticsRepository, RolePermissionRepository, RoleRepository,
    ScopeFilter, UpdateRoleInput, UserOverrideRepository,
};
use agrinova_core::{AppError, UserId};
use agrinova_domain::{
    EstateId, Permission, PermissionScope, Role, RoleName, effective_permission_names,
};
use chrono::{Duration, SubsecRound, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::PostgresRbacRepository;
use crate::MIGRATOR;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres rbac tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

async fn create_role(repository: &PostgresRbacRepository, level: i32, is_system: bool) -> Role {
    let name = unique("ROLE");
    let role_name = match RoleName::new(name.as_str()) {
        Ok(role_name) => role_name,
        Err(error) => panic!("{error}"),
    };

    match repository
        .create_role(
            role_name,
            CreateRoleInput {
                name: name.clone(),
                display_name: name,
                level,
                description: String::new(),
                is_system,
            },
        )
        .await
    {
        Ok(role) => role,
        Err(error) => panic!("failed to create role: {error}"),
    }
}

async fn create_permission(repository: &PostgresRbacRepository) -> Permission {
    let resource = unique("resource");
    match repository
        .create_permission(CreatePermissionInput {
            name: Permission::compose_name(resource.as_str(), "read"),
            resource,
            action: "read".to_owned(),
            description: String::new(),
        })
        .await
    {
        Ok(permission) => permission,
        Err(error) => panic!("failed to create permission: {error}"),
    }
}

async fn create_user(pool: &PgPool, role: &str) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query("INSERT INTO users (id, role, is_active) VALUES ($1, $2, TRUE)")
        .bind(user_id.as_uuid())
        .bind(role)
        .execute(pool)
        .await;
    assert!(insert.is_ok());
    user_id
}

#[tokio::test]
async fn duplicate_role_name_is_already_exists() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, 5, false).await;

    let duplicate = repository
        .create_role(
            role.name.clone(),
            CreateRoleInput {
                name: role.name.to_string(),
                display_name: "Duplicate".to_owned(),
                level: 5,
                description: String::new(),
                is_system: false,
            },
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
}

#[tokio::test]
async fn system_roles_cannot_be_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let system = create_role(&repository, 2, true).await;
    let custom = create_role(&repository, 6, false).await;

    let protected = repository.soft_delete_role(system.id).await;
    assert!(matches!(protected, Err(AppError::SystemRoleProtected(_))));

    assert!(repository.soft_delete_role(custom.id).await.is_ok());
    let reloaded = repository.find_role_by_id(custom.id).await;
    assert!(reloaded.is_ok_and(|role| role.is_none()));
}

#[tokio::test]
async fn deleted_rows_are_hidden_from_every_query() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, 6, false).await;
    let permission = create_permission(&repository).await;

    assert!(repository.soft_delete_role(role.id).await.is_ok());
    assert!(
        repository
            .soft_delete_permission(permission.id)
            .await
            .is_ok()
    );

    assert!(matches!(
        repository.soft_delete_role(role.id).await,
        Err(AppError::NotFound(_))
    ));
    let revived = repository
        .update_role(
            role.id,
            UpdateRoleInput {
                is_active: Some(true),
                ..UpdateRoleInput::default()
            },
        )
        .await;
    assert!(matches!(revived, Err(AppError::NotFound(_))));
    assert!(
        repository
            .find_role_by_name(&role.name)
            .await
            .is_ok_and(|found| found.is_none())
    );
    let roles = repository.list_roles(false).await.unwrap_or_default();
    assert!(roles.iter().all(|listed| listed.id != role.id));

    assert!(matches!(
        repository.soft_delete_permission(permission.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        repository
            .find_permission_by_name(permission.name.as_str())
            .await
            .is_ok_and(|found| found.is_none())
    );
    let by_resource = repository
        .list_permissions_by_resource(permission.resource.as_str())
        .await
        .unwrap_or_default();
    assert!(by_resource.is_empty());
    assert!(matches!(
        repository.assign_permissions(role.id, &[]).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn statistics_expired_count_matches_sweep_boundary() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool.clone());
    let permission = create_permission(&repository).await;
    let user_id = create_user(&pool, "MANDOR").await;
    let now = Utc::now().trunc_subsecs(6);

    let created = repository
        .create_override(NewUserOverride {
            user_id,
            permission_id: permission.id,
            is_granted: true,
            scope: None,
            expires_at: Some(now),
            reason: None,
            created_by: user_id,
        })
        .await;
    assert!(created.is_ok());

    let at_expiry = repository.rbac_statistics(now).await.unwrap_or_default();
    let just_after = repository
        .rbac_statistics(now + Duration::microseconds(1))
        .await
        .unwrap_or_default();
    assert_eq!(
        just_after.expired_user_overrides,
        at_expiry.expired_user_overrides + 1
    );

    let swept = repository.cleanup_expired_overrides(now).await;
    assert!(swept.is_ok());
    let list = repository.list_overrides(user_id).await.unwrap_or_default();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn assignment_is_idempotent_and_removal_spares_inherited_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let source = create_role(&repository, 4, false).await;
    let target = create_role(&repository, 5, false).await;
    let permission = create_permission(&repository).await;

    let first = repository
        .assign_permissions(target.id, &[permission.id])
        .await;
    let second = repository
        .assign_permissions(target.id, &[permission.id])
        .await;
    assert_eq!(first.unwrap_or_default(), 1);
    assert_eq!(second.unwrap_or_default(), 0);

    assert!(
        repository
            .assign_permissions(source.id, &[permission.id])
            .await
            .is_ok()
    );
    let inherited = repository.inherit_permissions(target.id, source.id).await;
    assert_eq!(inherited.unwrap_or_default(), 1);

    let removed = repository
        .remove_permissions(target.id, &[permission.id])
        .await;
    assert_eq!(removed.unwrap_or_default(), 1);

    let entries = repository
        .list_role_permission_entries(target.id)
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].inherited_from_role_id, Some(source.id));
}

#[tokio::test]
async fn direct_denial_hides_inherited_grant() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let source = create_role(&repository, 4, false).await;
    let target = create_role(&repository, 5, false).await;
    let permission = create_permission(&repository).await;

    assert!(
        repository
            .assign_permissions(source.id, &[permission.id])
            .await
            .is_ok()
    );
    assert!(
        repository
            .inherit_permissions(target.id, source.id)
            .await
            .is_ok()
    );
    assert!(
        repository
            .deny_permissions(target.id, &[permission.id])
            .await
            .is_ok()
    );

    let entries = repository
        .list_role_permission_entries(target.id)
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 2);
    assert!(!effective_permission_names(&entries).contains(&permission.name));
}

#[tokio::test]
async fn unknown_permission_is_not_found_on_assignment() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, 5, false).await;

    let result = repository
        .assign_permissions(role.id, &[agrinova_domain::PermissionId::new()])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn overrides_round_trip_scope_and_expiry() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool.clone());
    let permission = create_permission(&repository).await;
    let user_id = create_user(&pool, "MANDOR").await;
    let now = Utc::now();
    let estate_scope = PermissionScope::estate(EstateId::new());

    for (is_granted, scope, expires_at) in [
        (true, None, None),
        (false, Some(estate_scope), None),
        (true, None, Some(now - Duration::hours(1))),
    ] {
        let created = repository
            .create_override(NewUserOverride {
                user_id,
                permission_id: permission.id,
                is_granted,
                scope,
                expires_at,
                reason: Some("harvest season".to_owned()),
                created_by: user_id,
            })
            .await;
        assert!(created.is_ok_and(|stored| stored.scope == scope
            && stored.permission_name == permission.name));
    }

    let all = repository.list_overrides(user_id).await.unwrap_or_default();
    assert_eq!(all.len(), 3);

    let active = repository
        .list_active_overrides_for_permission(user_id, permission.id, now)
        .await
        .unwrap_or_default();
    assert_eq!(active.len(), 2);

    let removed = repository
        .remove_overrides(OverrideRemoval {
            user_id,
            permission_id: permission.id,
            scope: ScopeFilter::Exact(estate_scope),
        })
        .await;
    assert_eq!(removed.unwrap_or_default(), 1);

    let purged = repository.cleanup_expired_overrides(now).await;
    assert!(purged.is_ok_and(|count| count >= 1));

    let remaining = repository.list_overrides(user_id).await.unwrap_or_default();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].scope.is_none());

    let stats = repository.rbac_statistics(now).await;
    assert!(stats.is_ok_and(|stats| stats.expired_user_overrides
        == stats.total_user_overrides - stats.active_user_overrides));
}
