//! 角色策略
//!
//! 所有访问控制都经过 [`authorize`]：给定调用者角色、资源和动作，
//! 返回是否允许。路由层通过 [`require_permission`](super::require_permission)
//! 统一调用。
//!
//! | 资源 | Read | Write | Delete |
//! |------|------|-------|--------|
//! | Branch | 任意 | Owner | Owner |
//! | Category / Table / Menu / AddOn | 任意 | Manager | Manager |
//! | Upload | - | Manager | - |
//! | Order | 任意 | 任意 | Assistant |
//! | Sale | Assistant | Assistant | Manager |
//! | User (管理) | Owner | Owner | Owner |
//!
//! Root 拥有所有权限。

use shared::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Branch,
    Category,
    Table,
    Menu,
    AddOn,
    Upload,
    Order,
    Sale,
    User,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Branch => "branches",
            Self::Category => "categories",
            Self::Table => "tables",
            Self::Menu => "menus",
            Self::AddOn => "add_ons",
            Self::Upload => "uploads",
            Self::Order => "orders",
            Self::Sale => "sales",
            Self::User => "users",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

/// Lowest role allowed to perform `action` on `resource`
pub fn minimum_role(resource: Resource, action: Action) -> Role {
    use Action::*;
    use Resource::*;

    match (resource, action) {
        (Branch | Category | Table | Menu | AddOn, Read) => Role::Staff,
        (Branch, Write | Delete) => Role::Owner,
        (Category | Table | Menu | AddOn, Write | Delete) => Role::Manager,
        (Upload, _) => Role::Manager,
        (Order, Read | Write) => Role::Staff,
        (Order, Delete) => Role::Assistant,
        (Sale, Read | Write) => Role::Assistant,
        (Sale, Delete) => Role::Manager,
        (User, _) => Role::Owner,
    }
}

/// Single policy check consulted by every protected route
pub fn authorize(role: Role, resource: Resource, action: Action) -> bool {
    role == Role::Root || role >= minimum_role(resource, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_can_take_orders() {
        assert!(authorize(Role::Staff, Resource::Order, Action::Write));
        assert!(authorize(Role::Staff, Resource::Menu, Action::Read));
        assert!(!authorize(Role::Staff, Resource::Order, Action::Delete));
        assert!(!authorize(Role::Staff, Resource::Sale, Action::Write));
    }

    #[test]
    fn test_assistant_settles() {
        assert!(authorize(Role::Assistant, Resource::Sale, Action::Write));
        assert!(authorize(Role::Assistant, Resource::Order, Action::Delete));
        assert!(!authorize(Role::Assistant, Resource::Sale, Action::Delete));
        assert!(!authorize(Role::Assistant, Resource::Menu, Action::Write));
    }

    #[test]
    fn test_manager_and_owner() {
        assert!(authorize(Role::Manager, Resource::Menu, Action::Delete));
        assert!(authorize(Role::Manager, Resource::Upload, Action::Write));
        assert!(!authorize(Role::Manager, Resource::Branch, Action::Write));
        assert!(!authorize(Role::Manager, Resource::User, Action::Read));
        assert!(authorize(Role::Owner, Resource::Branch, Action::Write));
        assert!(authorize(Role::Owner, Resource::User, Action::Delete));
    }

    #[test]
    fn test_root_can_do_everything() {
        for resource in [
            Resource::Branch,
            Resource::Category,
            Resource::Table,
            Resource::Menu,
            Resource::AddOn,
            Resource::Upload,
            Resource::Order,
            Resource::Sale,
            Resource::User,
        ] {
            for action in [Action::Read, Action::Write, Action::Delete] {
                assert!(authorize(Role::Root, resource, action));
            }
        }
    }
}
