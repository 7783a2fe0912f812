use serde::Deserialize;

/// Optional filters for `POST /users/all/{pageNumber}/{pageSize}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    /// Substring match on email or name.
    pub search: Option<String>,
    pub user_type: Option<String>,
    pub disabled: Option<bool>,
    pub email_verified: Option<bool>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Email,
    Name,
}

impl SortBy {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "u.created_at",
            Self::Email => "u.email",
            Self::Name => "u.name",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
