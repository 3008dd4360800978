use crate::api::CatalogNode;

/// Normalize raw search input into the stored filter form.
pub fn normalize_filter(input: &str) -> String {
    input.to_lowercase()
}

/// Batches whose name contains `keyword`, case-insensitively, in their
/// original order. An empty keyword keeps everything.
pub fn filter_batches(batches: &[CatalogNode], keyword: &str) -> Vec<CatalogNode> {
    if keyword.is_empty() {
        return batches.to_vec();
    }
    let keyword = keyword.to_lowercase();
    batches
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&keyword))
        .cloned()
        .collect()
}
