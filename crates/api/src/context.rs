use vault_auth::Role;
use vault_core::UserId;

/// Who is calling, as established by the sign-in middleware.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequesterContext {
    user_id: UserId,
    role: Role,
}

impl RequesterContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
