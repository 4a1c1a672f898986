//! Role-based authorization policy consumed uniformly by every handler.

use crate::model::Role;

/// Everything a session can attempt against the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ModerateContent,
    SubmitContent,
    ManageUsers,
    Purchase,
    Withdraw,
}

/// Single policy decision point; handlers never compare roles inline.
pub fn allow(role: Role, action: Action) -> bool {
    match action {
        Action::ModerateContent | Action::ManageUsers => matches!(role, Role::Admin),
        Action::SubmitContent | Action::Withdraw => matches!(role, Role::Creator | Role::Admin),
        Action::Purchase => true,
    }
}
