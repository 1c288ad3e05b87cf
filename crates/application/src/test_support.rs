use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use agrinova_core::{AppError, AppResult, UserId, UserIdentity};
use agrinova_domain::{
    Block, BlockId, Company, CompanyId, Division, DivisionId, Estate, EstateId, OverrideId,
    Permission, PermissionId, Role, RoleId, RoleName, RolePermissionEntry,
    UserPermissionOverride,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::rbac_ports::{
    AssignmentRepository, AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput,
    NewUserOverride, OrganizationRepository, OverrideRemoval, PermissionRepository,
    RbacStatisticsRepository, RbacStats, RoleRepository, RolePermissionRepository,
    UpdatePermissionInput, UpdateRoleInput, UserDirectory, UserOverrideRepository,
};
use crate::{AccessScopeStores, RbacStores};

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Clock pinned to an adjustable instant.
pub(crate) struct FixedClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: chrono::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

#[derive(Debug, Clone)]
struct StoredRolePermission {
    role_id: RoleId,
    permission_id: PermissionId,
    inherited_from_role_id: Option<RoleId>,
    is_denied: bool,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct RbacState {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    deleted_roles: HashSet<RoleId>,
    deleted_permissions: HashSet<PermissionId>,
    role_permissions: Vec<StoredRolePermission>,
    overrides: Vec<UserPermissionOverride>,
    users: HashMap<UserId, UserIdentity>,
    companies: HashMap<CompanyId, Company>,
    estates: HashMap<EstateId, Estate>,
    divisions: HashMap<DivisionId, Division>,
    blocks: HashMap<BlockId, Block>,
    company_assignments: HashSet<(UserId, CompanyId)>,
    estate_assignments: HashSet<(UserId, EstateId)>,
    division_assignments: HashSet<(UserId, DivisionId)>,
    audit_events: Vec<AuditEvent>,
    insert_sequence: i64,
}

impl RbacState {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.insert_sequence += 1;
        base_time() + chrono::Duration::seconds(self.insert_sequence)
    }

    fn live_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles
            .iter()
            .filter(|role| !self.deleted_roles.contains(&role.id))
    }

    fn live_permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions
            .iter()
            .filter(|permission| !self.deleted_permissions.contains(&permission.id))
    }

    fn require_live_role(&self, role_id: RoleId) -> AppResult<()> {
        if self.live_roles().any(|role| role.id == role_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("role {role_id} not found")))
        }
    }

    fn permission(&self, permission_id: PermissionId) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.id == permission_id)
    }
}

/// In-memory implementation of every RBAC port.
#[derive(Default)]
pub(crate) struct InMemoryRbac {
    state: Mutex<RbacState>,
    latency: std::sync::Mutex<Option<Duration>>,
    failing: std::sync::atomic::AtomicBool,
}

impl InMemoryRbac {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Delays every read so deadline handling can be exercised.
    pub(crate) fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut value) = self.latency.lock() {
            *value = latency;
        }
    }

    /// Makes every read fail with an internal error.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    async fn gate(&self) -> AppResult<()> {
        let latency = self.latency.lock().map(|value| *value).unwrap_or(None);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::Internal("store unavailable".to_owned()));
        }

        Ok(())
    }

    pub(crate) async fn seed_role(&self, name: &str, level: i32, is_system: bool) -> Role {
        let mut state = self.state.lock().await;
        let now = state.next_timestamp();
        let role = Role {
            id: RoleId::new(),
            name: RoleName::new(name).unwrap_or_else(|error| panic!("{error}")),
            display_name: name.to_owned(),
            level,
            description: String::new(),
            is_active: true,
            is_system,
            created_at: now,
            updated_at: now,
        };
        state.roles.push(role.clone());
        role
    }

    pub(crate) async fn seed_permission(&self, name: &str) -> Permission {
        let mut state = self.state.lock().await;
        let now = state.next_timestamp();
        let (resource, action) = name.split_once(':').unwrap_or((name, ""));
        let permission = Permission {
            id: PermissionId::new(),
            name: name.to_owned(),
            resource: resource.to_owned(),
            action: action.to_owned(),
            description: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.permissions.push(permission.clone());
        permission
    }

    pub(crate) async fn seed_user(&self, role: &str, is_active: bool) -> UserId {
        let user_id = UserId::new();
        self.state
            .lock()
            .await
            .users
            .insert(user_id, UserIdentity::new(user_id, role, is_active));
        user_id
    }

    pub(crate) async fn set_user_active(&self, user_id: UserId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get(&user_id).cloned() {
            state.users.insert(
                user_id,
                UserIdentity::new(user_id, user.role(), is_active),
            );
        }
    }

    pub(crate) async fn set_permission_active(&self, permission_id: PermissionId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(permission) = state
            .permissions
            .iter_mut()
            .find(|permission| permission.id == permission_id)
        {
            permission.is_active = is_active;
        }
    }

    pub(crate) async fn set_role_active(&self, role_id: RoleId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(role) = state.roles.iter_mut().find(|role| role.id == role_id) {
            role.is_active = is_active;
        }
    }

    pub(crate) async fn seed_override(
        &self,
        user_id: UserId,
        permission: &Permission,
        is_granted: bool,
        scope: Option<agrinova_domain::PermissionScope>,
        expires_at: Option<DateTime<Utc>>,
    ) -> UserPermissionOverride {
        let mut state = self.state.lock().await;
        let created_at = state.next_timestamp();
        let stored = UserPermissionOverride {
            id: OverrideId::new(),
            user_id,
            permission_id: permission.id,
            permission_name: permission.name.clone(),
            is_granted,
            scope,
            expires_at,
            reason: None,
            created_by: UserId::new(),
            created_at,
        };
        state.overrides.push(stored.clone());
        stored
    }

    pub(crate) async fn seed_company(&self) -> CompanyId {
        let company = Company {
            id: CompanyId::new(),
            name: "PT Agrinova".to_owned(),
        };
        let company_id = company.id;
        self.state.lock().await.companies.insert(company_id, company);
        company_id
    }

    pub(crate) async fn seed_estate(&self, company_id: CompanyId) -> EstateId {
        let estate = Estate {
            id: EstateId::new(),
            company_id,
            name: "Estate Sawit".to_owned(),
        };
        let estate_id = estate.id;
        self.state.lock().await.estates.insert(estate_id, estate);
        estate_id
    }

    pub(crate) async fn seed_division(
        &self,
        estate_id: EstateId,
        company_id: Option<CompanyId>,
    ) -> DivisionId {
        let division = Division {
            id: DivisionId::new(),
            estate_id,
            company_id,
            name: "Divisi I".to_owned(),
        };
        let division_id = division.id;
        self.state
            .lock()
            .await
            .divisions
            .insert(division_id, division);
        division_id
    }

    pub(crate) async fn seed_block(&self, division_id: DivisionId) -> BlockId {
        let block = Block {
            id: BlockId::new(),
            division_id,
            name: "Blok A01".to_owned(),
        };
        let block_id = block.id;
        self.state.lock().await.blocks.insert(block_id, block);
        block_id
    }

    pub(crate) async fn assign_company(&self, user_id: UserId, company_id: CompanyId) {
        self.state
            .lock()
            .await
            .company_assignments
            .insert((user_id, company_id));
    }

    pub(crate) async fn assign_estate(&self, user_id: UserId, estate_id: EstateId) {
        self.state
            .lock()
            .await
            .estate_assignments
            .insert((user_id, estate_id));
    }

    pub(crate) async fn assign_division(&self, user_id: UserId, division_id: DivisionId) {
        self.state
            .lock()
            .await
            .division_assignments
            .insert((user_id, division_id));
    }

    pub(crate) async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.audit_events.clone()
    }

    pub(crate) async fn stored_overrides(&self) -> Vec<UserPermissionOverride> {
        self.state.lock().await.overrides.clone()
    }

    pub(crate) async fn direct_row_count(&self, role_id: RoleId, permission_id: PermissionId) -> usize {
        self.state
            .lock()
            .await
            .role_permissions
            .iter()
            .filter(|row| {
                row.role_id == role_id
                    && row.permission_id == permission_id
                    && row.inherited_from_role_id.is_none()
            })
            .count()
    }
}

pub(crate) fn rbac_stores(store: &Arc<InMemoryRbac>) -> RbacStores {
    RbacStores {
        roles: store.clone(),
        permissions: store.clone(),
        role_permissions: store.clone(),
        overrides: store.clone(),
        users: store.clone(),
    }
}

pub(crate) fn access_scope_stores(store: &Arc<InMemoryRbac>) -> AccessScopeStores {
    AccessScopeStores {
        users: store.clone(),
        roles: store.clone(),
        organization: store.clone(),
        assignments: store.clone(),
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbac {
    async fn create_role(&self, name: RoleName, input: CreateRoleInput) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.name == name) {
            return Err(AppError::AlreadyExists(format!("role '{name}' already exists")));
        }

        let now = state.next_timestamp();
        let role = Role {
            id: RoleId::new(),
            name,
            display_name: input.display_name,
            level: input.level,
            description: input.description,
            is_active: true,
            is_system: input.is_system,
            created_at: now,
            updated_at: now,
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        state.require_live_role(role_id)?;
        let now = state.next_timestamp();
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;

        if let Some(display_name) = input.display_name {
            role.display_name = display_name;
        }
        if let Some(description) = input.description {
            role.description = description;
        }
        if let Some(is_active) = input.is_active {
            role.is_active = is_active;
        }
        role.updated_at = now;
        Ok(role.clone())
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_live_role(role_id)?;
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;
        if role.is_system {
            return Err(AppError::SystemRoleProtected(format!(
                "role '{}' is a system role",
                role.name
            )));
        }

        role.is_active = false;
        state.deleted_roles.insert(role_id);
        Ok(())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .live_roles()
            .find(|role| role.id == role_id)
            .cloned())
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .live_roles()
            .find(|role| &role.name == name)
            .cloned())
    }

    async fn list_roles(&self, active_only: bool) -> AppResult<Vec<Role>> {
        self.gate().await?;
        let mut roles: Vec<Role> = self
            .state
            .lock()
            .await
            .live_roles()
            .filter(|role| !active_only || role.is_active)
            .cloned()
            .collect();
        roles.sort_by(|left, right| {
            left.level
                .cmp(&right.level)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(roles)
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbac {
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state
            .permissions
            .iter()
            .any(|permission| permission.name == input.name)
        {
            return Err(AppError::AlreadyExists(format!(
                "permission '{}' already exists",
                input.name
            )));
        }

        let now = state.next_timestamp();
        let permission = Permission {
            id: PermissionId::new(),
            name: input.name,
            resource: input.resource,
            action: input.action,
            description: input.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state.deleted_permissions.contains(&permission_id) {
            return Err(AppError::NotFound(format!(
                "permission {permission_id} not found"
            )));
        }
        let now = state.next_timestamp();
        let permission = state
            .permissions
            .iter_mut()
            .find(|permission| permission.id == permission_id)
            .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} not found")))?;

        if let Some(description) = input.description {
            permission.description = description;
        }
        if let Some(is_active) = input.is_active {
            permission.is_active = is_active;
        }
        permission.updated_at = now;
        Ok(permission.clone())
    }

    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.deleted_permissions.contains(&permission_id) {
            return Err(AppError::NotFound(format!(
                "permission {permission_id} not found"
            )));
        }
        let permission = state
            .permissions
            .iter_mut()
            .find(|permission| permission.id == permission_id)
            .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} not found")))?;
        permission.is_active = false;
        state.deleted_permissions.insert(permission_id);
        Ok(())
    }

    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .live_permissions()
            .find(|permission| permission.id == permission_id)
            .cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .live_permissions()
            .find(|permission| permission.name == name)
            .cloned())
    }

    async fn list_permissions(&self, active_only: bool) -> AppResult<Vec<Permission>> {
        self.gate().await?;
        let mut permissions: Vec<Permission> = self
            .state
            .lock()
            .await
            .live_permissions()
            .filter(|permission| !active_only || permission.is_active)
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(permissions)
    }

    async fn list_permissions_by_resource(&self, resource: &str) -> AppResult<Vec<Permission>> {
        let mut permissions = self.list_permissions(false).await?;
        permissions.retain(|permission| permission.resource == resource);
        Ok(permissions)
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryRbac {
    async fn assign_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        state.require_live_role(role_id)?;

        let mut inserted = 0;
        for permission_id in permission_ids {
            let exists = state.role_permissions.iter().any(|row| {
                row.role_id == role_id
                    && row.permission_id == *permission_id
                    && row.inherited_from_role_id.is_none()
            });
            if exists {
                continue;
            }

            let created_at = state.next_timestamp();
            state.role_permissions.push(StoredRolePermission {
                role_id,
                permission_id: *permission_id,
                inherited_from_role_id: None,
                is_denied: false,
                created_at,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn deny_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        state.require_live_role(role_id)?;

        let mut affected = 0;
        for permission_id in permission_ids {
            if let Some(row) = state.role_permissions.iter_mut().find(|row| {
                row.role_id == role_id
                    && row.permission_id == *permission_id
                    && row.inherited_from_role_id.is_none()
            }) {
                row.is_denied = true;
            } else {
                let created_at = state.next_timestamp();
                state.role_permissions.push(StoredRolePermission {
                    role_id,
                    permission_id: *permission_id,
                    inherited_from_role_id: None,
                    is_denied: true,
                    created_at,
                });
            }
            affected += 1;
        }

        Ok(affected)
    }

    async fn inherit_permissions(
        &self,
        role_id: RoleId,
        source_role_id: RoleId,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        state.require_live_role(role_id)?;
        state.require_live_role(source_role_id)?;

        let source_grants: Vec<PermissionId> = state
            .role_permissions
            .iter()
            .filter(|row| {
                row.role_id == source_role_id
                    && row.inherited_from_role_id.is_none()
                    && !row.is_denied
            })
            .map(|row| row.permission_id)
            .collect();

        let mut inserted = 0;
        for permission_id in source_grants {
            let exists = state.role_permissions.iter().any(|row| {
                row.role_id == role_id
                    && row.permission_id == permission_id
                    && row.inherited_from_role_id == Some(source_role_id)
            });
            if exists {
                continue;
            }

            let created_at = state.next_timestamp();
            state.role_permissions.push(StoredRolePermission {
                role_id,
                permission_id,
                inherited_from_role_id: Some(source_role_id),
                is_denied: false,
                created_at,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn remove_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.role_permissions.len();
        state.role_permissions.retain(|row| {
            !(row.role_id == role_id
                && row.inherited_from_role_id.is_none()
                && permission_ids.contains(&row.permission_id))
        });
        Ok((before - state.role_permissions.len()) as u64)
    }

    async fn list_role_permission_entries(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionEntry>> {
        self.gate().await?;
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|row| row.role_id == role_id)
            .filter_map(|row| {
                state
                    .permission(row.permission_id)
                    .map(|permission| RolePermissionEntry {
                        role_id: row.role_id,
                        permission: permission.clone(),
                        inherited_from_role_id: row.inherited_from_role_id,
                        is_denied: row.is_denied,
                        created_at: row.created_at,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl UserOverrideRepository for InMemoryRbac {
    async fn create_override(&self, input: NewUserOverride) -> AppResult<UserPermissionOverride> {
        let mut state = self.state.lock().await;
        let permission_name = state
            .permission(input.permission_id)
            .map(|permission| permission.name.clone())
            .ok_or_else(|| {
                AppError::NotFound(format!("permission {} not found", input.permission_id))
            })?;
        let created_at = state.next_timestamp();
        let stored = UserPermissionOverride {
            id: OverrideId::new(),
            user_id: input.user_id,
            permission_id: input.permission_id,
            permission_name,
            is_granted: input.is_granted,
            scope: input.scope,
            expires_at: input.expires_at,
            reason: input.reason,
            created_by: input.created_by,
            created_at,
        };
        state.overrides.push(stored.clone());
        Ok(stored)
    }

    async fn remove_overrides(&self, removal: OverrideRemoval) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.overrides.len();
        state.overrides.retain(|stored| {
            !(stored.user_id == removal.user_id
                && stored.permission_id == removal.permission_id
                && removal.scope.matches(stored.scope.as_ref()))
        });
        Ok((before - state.overrides.len()) as u64)
    }

    async fn list_overrides(&self, user_id: UserId) -> AppResult<Vec<UserPermissionOverride>> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .overrides
            .iter()
            .filter(|stored| stored.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_active_overrides(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let mut overrides = self.list_overrides(user_id).await?;
        overrides.retain(|stored| stored.is_active_at(now));
        Ok(overrides)
    }

    async fn list_active_overrides_for_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let mut overrides = self.list_active_overrides(user_id, now).await?;
        overrides.retain(|stored| stored.permission_id == permission_id);
        Ok(overrides)
    }

    async fn clear_overrides(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.overrides.len();
        state.overrides.retain(|stored| stored.user_id != user_id);
        Ok((before - state.overrides.len()) as u64)
    }

    async fn cleanup_expired_overrides(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.overrides.len();
        state.overrides.retain(|stored| !stored.is_expired_at(now));
        Ok((before - state.overrides.len()) as u64)
    }
}

#[async_trait]
impl UserDirectory for InMemoryRbac {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserIdentity>> {
        self.gate().await?;
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryRbac {
    async fn find_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        self.gate().await?;
        Ok(self.state.lock().await.companies.get(&company_id).cloned())
    }

    async fn find_estate(&self, estate_id: EstateId) -> AppResult<Option<Estate>> {
        self.gate().await?;
        Ok(self.state.lock().await.estates.get(&estate_id).cloned())
    }

    async fn find_division(&self, division_id: DivisionId) -> AppResult<Option<Division>> {
        self.gate().await?;
        Ok(self.state.lock().await.divisions.get(&division_id).cloned())
    }

    async fn find_block(&self, block_id: BlockId) -> AppResult<Option<Block>> {
        self.gate().await?;
        Ok(self.state.lock().await.blocks.get(&block_id).cloned())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRbac {
    async fn has_company_assignment(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .company_assignments
            .contains(&(user_id, company_id)))
    }

    async fn has_active_estate_assignment(
        &self,
        user_id: UserId,
        estate_id: EstateId,
    ) -> AppResult<bool> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .estate_assignments
            .contains(&(user_id, estate_id)))
    }

    async fn has_active_division_assignment(
        &self,
        user_id: UserId,
        division_id: DivisionId,
    ) -> AppResult<bool> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .await
            .division_assignments
            .contains(&(user_id, division_id)))
    }
}

#[async_trait]
impl RbacStatisticsRepository for InMemoryRbac {
    async fn rbac_statistics(&self, now: DateTime<Utc>) -> AppResult<RbacStats> {
        let state = self.state.lock().await;
        let count = |value: usize| value as u64;
        let total_roles = count(state.live_roles().count());
        let system_roles = count(state.live_roles().filter(|role| role.is_system).count());
        let active_user_overrides = state
            .overrides
            .iter()
            .filter(|stored| stored.is_active_at(now))
            .count();
        let expired_user_overrides = state
            .overrides
            .iter()
            .filter(|stored| stored.is_expired_at(now))
            .count();

        Ok(RbacStats {
            total_roles,
            active_roles: count(state.live_roles().filter(|role| role.is_active).count()),
            system_roles,
            custom_roles: total_roles - system_roles,
            total_permissions: count(state.live_permissions().count()),
            active_permissions: count(
                state
                    .live_permissions()
                    .filter(|permission| permission.is_active)
                    .count(),
            ),
            total_role_permissions: count(state.role_permissions.len()),
            total_user_overrides: count(state.overrides.len()),
            active_user_overrides: count(active_user_overrides),
            expired_user_overrides: count(expired_user_overrides),
        })
    }
}

#[async_trait]
impl AuditRepository for InMemoryRbac {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit_events.push(event);
        Ok(())
    }
}
