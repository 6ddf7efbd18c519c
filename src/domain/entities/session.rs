use crate::{entities::token::Claims, errors::AppError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub display_name: Option<String>,
}

/// The signed-in identity an editor acts for.
///
/// Editors receive a `Session` when they are built and never look one up on
/// their own, so the same editor code serves requests and tests alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { user: None }
    }

    pub fn authenticated(user_id: impl Into<String>, display_name: Option<String>) -> Self {
        Session {
            user: Some(SessionUser {
                user_id: user_id.into(),
                display_name,
            }),
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.user_id.as_str())
    }

    pub fn require_user(&self) -> Result<&SessionUser, AppError> {
        self.user.as_ref().ok_or(AppError::UnauthorizedAccess)
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session::authenticated(claims.sub, claims.name)
    }
}
