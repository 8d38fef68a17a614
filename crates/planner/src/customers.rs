//! Customer picker backing list.

use campaign_core::ALL_CUSTOMERS;

#[derive(Debug, Clone)]
pub struct CustomerDirectory {
    names: Vec<String>,
}

impl CustomerDirectory {
    /// The "All Customers" entry is always present and always first.
    pub fn new(names: Vec<String>) -> Self {
        let mut all = vec![ALL_CUSTOMERS.to_string()];
        all.extend(names.into_iter().filter(|n| n != ALL_CUSTOMERS && !n.trim().is_empty()));
        Self { names: all }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Case-insensitive substring match; an empty query lists everyone.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        self.names
            .iter()
            .filter(|n| n.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}
