//! Descriptors of the paginated REST resources managed by the admin views.

use crate::domain::types::{FieldName, SortKey, StatusFilter};

/// Default free-text search field, sent as the `search` query parameter.
pub const DEFAULT_SEARCH_FIELD: &str = "search";

/// REST path plus the whitelisted search fields, sort keys and statuses of a
/// resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescriptor {
    name: String,
    path: String,
    search_fields: Vec<FieldName>,
    sort_keys: Vec<SortKey>,
    statuses: Vec<StatusFilter>,
}

/// Builds a list of validated names from compile-time literals, skipping blanks.
fn names<T>(values: &[&str]) -> Vec<T>
where
    T: for<'a> TryFrom<&'a str>,
{
    values
        .iter()
        .filter_map(|value| T::try_from(*value).ok())
        .collect()
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            search_fields: names(&[DEFAULT_SEARCH_FIELD]),
            sort_keys: Vec::new(),
            statuses: Vec::new(),
        }
    }

    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = names(fields);
        self
    }

    pub fn sort_keys(mut self, keys: &[&str]) -> Self {
        self.sort_keys = names(keys);
        self
    }

    pub fn statuses(mut self, statuses: &[&str]) -> Self {
        self.statuses = names(statuses);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the API base URL, without leading slash.
    pub fn path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    pub fn search_field(&self, field: &str) -> Option<&FieldName> {
        self.search_fields.iter().find(|f| f.as_str() == field.trim())
    }

    pub fn sort_key(&self, key: &str) -> Option<&SortKey> {
        self.sort_keys.iter().find(|k| k.as_str() == key.trim())
    }

    pub fn status(&self, status: &str) -> Option<&StatusFilter> {
        self.statuses.iter().find(|s| s.as_str() == status.trim())
    }

    pub fn categories() -> Self {
        Self::new("categories", "categories")
            .sort_keys(&["name", "created_at", "updated_at"])
            .statuses(&["active", "inactive"])
    }

    pub fn customers() -> Self {
        Self::new("customers", "customers")
            .search_fields(&[DEFAULT_SEARCH_FIELD, "email", "phone"])
            .sort_keys(&["name", "email", "created_at"])
            .statuses(&["active", "inactive"])
    }

    pub fn customer_groups() -> Self {
        Self::new("customer-groups", "customer-groups")
            .sort_keys(&["name", "discount", "created_at"])
            .statuses(&["active", "inactive"])
    }

    pub fn products() -> Self {
        Self::new("products", "products")
            .search_fields(&[DEFAULT_SEARCH_FIELD, "sku", "category"])
            .sort_keys(&["name", "price", "stock", "created_at"])
            .statuses(&["active", "inactive", "draft"])
    }

    pub fn orders() -> Self {
        Self::new("orders", "orders")
            .search_fields(&[DEFAULT_SEARCH_FIELD, "customer"])
            .sort_keys(&["created_at", "total", "status"])
            .statuses(&["pending", "processing", "shipped", "completed", "cancelled"])
    }

    /// Looks up one of the built-in descriptors by resource name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim() {
            "categories" => Some(Self::categories()),
            "customers" => Some(Self::customers()),
            "customer-groups" | "customer_groups" => Some(Self::customer_groups()),
            "products" => Some(Self::products()),
            "orders" => Some(Self::orders()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_descriptors_resolve_by_name() {
        for name in ["categories", "customers", "customer-groups", "products", "orders"] {
            let descriptor = ResourceDescriptor::by_name(name).expect("known resource");
            assert_eq!(descriptor.name(), name);
            assert!(descriptor.search_field(DEFAULT_SEARCH_FIELD).is_some());
        }
        assert!(ResourceDescriptor::by_name("invoices").is_none());
    }

    #[test]
    fn whitelists_reject_unknown_names() {
        let customers = ResourceDescriptor::customers();
        assert!(customers.search_field("email").is_some());
        assert!(customers.search_field("password").is_none());
        assert!(customers.sort_key("name").is_some());
        assert!(customers.sort_key("price").is_none());
        assert!(customers.status("inactive").is_some());
        assert!(customers.status("draft").is_none());
    }

    #[test]
    fn path_drops_leading_slash() {
        let descriptor = ResourceDescriptor::new("things", "/admin/things");
        assert_eq!(descriptor.path(), "admin/things");
    }
}
