#[derive(Clone, Copy)]
pub(super) struct RoleSpec {
    pub(super) name: &'static str,
    pub(super) display_name: &'static str,
    pub(super) level: i32,
    pub(super) description: &'static str,
}

pub(super) const APEX_ROLE: &str = "SUPER_ADMIN";

pub(super) const SYSTEM_ROLES: [RoleSpec; 9] = [
    RoleSpec {
        name: APEX_ROLE,
        display_name: "Super Admin",
        level: 1,
        description: "System-wide administrator with full access",
    },
    RoleSpec {
        name: "COMPANY_ADMIN",
        display_name: "Company Admin",
        level: 2,
        description: "Company-level administrator",
    },
    RoleSpec {
        name: "AREA_MANAGER",
        display_name: "Area Manager",
        level: 3,
        description: "Multi-company oversight manager",
    },
    RoleSpec {
        name: "MANAGER",
        display_name: "Manager",
        level: 4,
        description: "Estate-level manager",
    },
    RoleSpec {
        name: "ASISTEN",
        display_name: "Asisten",
        level: 5,
        description: "Division-level assistant",
    },
    RoleSpec {
        name: "MANDOR",
        display_name: "Mandor",
        level: 5,
        description: "Field supervisor",
    },
    RoleSpec {
        name: "SATPAM",
        display_name: "Satpam",
        level: 5,
        description: "Security officer",
    },
    RoleSpec {
        name: "TIMBANGAN",
        display_name: "Timbangan",
        level: 5,
        description: "Weighing operator",
    },
    RoleSpec {
        name: "GRADING",
        display_name: "Grading",
        level: 5,
        description: "Quality grader",
    },
];

/// Resource and action pairs seeded into the catalog.
pub(super) const CORE_PERMISSIONS: [(&str, &str); 27] = [
    ("company", "read"),
    ("estate", "create"),
    ("estate", "read"),
    ("estate", "update"),
    ("estate", "delete"),
    ("division", "create"),
    ("division", "read"),
    ("division", "update"),
    ("division", "delete"),
    ("block", "create"),
    ("block", "read"),
    ("block", "update"),
    ("block", "delete"),
    ("employee", "create"),
    ("employee", "read"),
    ("employee", "update"),
    ("employee", "delete"),
    ("unit", "create"),
    ("unit", "read"),
    ("unit", "update"),
    ("unit", "delete"),
    ("harvest", "create"),
    ("harvest", "read"),
    ("harvest", "update"),
    ("harvest", "approve"),
    ("harvest", "reject"),
    ("rbac", "admin"),
];

pub(super) const ROLE_GRANTS: [(&str, &[&str]); 2] = [
    (
        "COMPANY_ADMIN",
        &[
            "company:read",
            "estate:create",
            "estate:read",
            "estate:update",
            "estate:delete",
            "division:create",
            "division:read",
            "division:update",
            "division:delete",
            "block:create",
            "block:read",
            "block:update",
            "block:delete",
            "employee:create",
            "employee:read",
            "employee:update",
            "employee:delete",
            "unit:create",
            "unit:read",
            "unit:update",
            "unit:delete",
        ],
    ),
    (
        "MANDOR",
        &[
            "block:read",
            "employee:read",
            "harvest:create",
            "harvest:read",
            "harvest:update",
        ],
    ),
];
