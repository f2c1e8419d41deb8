//! Structured filter/sort specification for user listings.
//!
//! Sortable fields are a closed enum translated into the storage query at
//! the boundary; raw strings from the transport layer are parsed into it
//! and never reach the query builder.

/// Fields a user listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Username,
    Email,
    Role,
}

impl UserSortField {
    /// Parses a field name from the transport layer.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "name" => Some(UserSortField::Name),
            "username" => Some(UserSortField::Username),
            "email" => Some(UserSortField::Email),
            "role" => Some(UserSortField::Role),
            _ => None,
        }
    }

    /// Returns the storage column for this field.
    pub fn column(&self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Username => "username",
            UserSortField::Email => "email",
            UserSortField::Role => "role",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parses a direction from the transport layer. Anything that is not
    /// "desc" sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    /// Returns the SQL keyword for this direction.
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Filter, sort, and paging specification for a user listing.
#[derive(Debug, Clone)]
pub struct UserListQuery {
    /// Case-insensitive substring matched against name, username, email,
    /// and role.
    pub filter: Option<String>,

    /// Sort field and direction; unsorted when absent.
    pub sort: Option<(UserSortField, SortDirection)>,

    /// 1-based page number.
    pub page: u32,

    /// Number of items per page.
    pub page_size: u32,
}

impl UserListQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Creates a query with default paging and no filter or sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter substring.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the sort field and direction.
    pub fn sort_by(mut self, field: UserSortField, direction: SortDirection) -> Self {
        self.sort = Some((field, direction));
        self
    }

    /// Sets the 1-based page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the number of items to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_field_parse_is_case_insensitive() {
        assert_eq!(UserSortField::parse("Name"), Some(UserSortField::Name));
        assert_eq!(UserSortField::parse("EMAIL"), Some(UserSortField::Email));
        assert_eq!(UserSortField::parse("id"), None);
        assert_eq!(UserSortField::parse("created_at"), None);
    }

    #[test]
    fn sort_direction_defaults_to_ascending() {
        assert_eq!(SortDirection::parse("asc"), SortDirection::Ascending);
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Descending);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Ascending);
    }

    #[test]
    fn default_query_pages_from_one() {
        let query = UserListQuery::new();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, UserListQuery::DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let query = UserListQuery::new().page(3).page_size(20);
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn page_zero_is_clamped() {
        let query = UserListQuery::new().page(0);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn builder_chain() {
        let query = UserListQuery::new()
            .filter("john")
            .sort_by(UserSortField::Email, SortDirection::Descending)
            .page(2)
            .page_size(5);

        assert_eq!(query.filter.as_deref(), Some("john"));
        assert_eq!(
            query.sort,
            Some((UserSortField::Email, SortDirection::Descending))
        );
        assert_eq!(query.offset(), 5);
    }
}
