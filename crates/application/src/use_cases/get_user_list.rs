//! User listing query types.

use store::{SortDirection, UserListQuery, UserSortField};

/// Raw listing parameters as they arrive from the transport layer.
///
/// Translated into the structured [`UserListQuery`] at this boundary;
/// unknown sort fields fall back to the store's default order.
#[derive(Debug, Clone, Default)]
pub struct GetUserListQuery {
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl GetUserListQuery {
    /// Builds the structured query specification.
    pub fn to_spec(&self) -> UserListQuery {
        let mut spec = UserListQuery::new();

        if let Some(filter) = &self.filter
            && !filter.trim().is_empty()
        {
            spec = spec.filter(filter.trim());
        }

        if let Some(field) = self.sort_by.as_deref().and_then(UserSortField::parse) {
            let direction = self
                .sort_direction
                .as_deref()
                .map(SortDirection::parse)
                .unwrap_or_default();
            spec = spec.sort_by(field, direction);
        }

        if let Some(page) = self.page {
            spec = spec.page(page);
        }
        if let Some(page_size) = self.page_size {
            spec = spec.page_size(page_size);
        }

        spec
    }
}
