use serde::{Deserialize, Deserializer};

/// A navigable catalog entry: a batch, a subject, or a chapter.
///
/// `url` is a relative path plus query string that, joined to the API base,
/// yields the listing endpoint for the next level down.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogNode {
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

/// Leaf content: a lecture, a note, or a DPP asset.
///
/// `url` is opaque. It may be a PDF link, a YouTube link, or an internal
/// locator that must go through the media-lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaItem {
    pub title: String,
    pub url: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    thumbnail: Option<String>,
}

impl MediaItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            image: None,
            thumbnail: None,
        }
    }

    /// Card image, falling back to the thumbnail when no image is set.
    pub fn artwork(&self) -> Option<&str> {
        self.image.as_deref().or(self.thumbnail.as_deref())
    }
}

/// Treat `""` and `null` the same as a missing field.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_node_without_image() {
        let node: CatalogNode =
            serde_json::from_str(r#"{"name":"Arjuna JEE","url":"/api/pw/subjects?batchId=abc"}"#)
                .unwrap();
        assert_eq!(node.name, "Arjuna JEE");
        assert_eq!(node.url, "/api/pw/subjects?batchId=abc");
        assert!(node.image.is_none());
    }

    #[test]
    fn test_catalog_node_null_and_empty_image() {
        let node: CatalogNode =
            serde_json::from_str(r#"{"name":"A","url":"/a","image":null}"#).unwrap();
        assert!(node.image.is_none());

        let node: CatalogNode =
            serde_json::from_str(r#"{"name":"A","url":"/a","image":""}"#).unwrap();
        assert!(node.image.is_none());
    }

    #[test]
    fn test_media_item_thumbnail_fallback() {
        let item: MediaItem = serde_json::from_str(
            r#"{"title":"Lecture 1","url":"x","thumbnail":"https://img/t.png"}"#,
        )
        .unwrap();
        assert_eq!(item.artwork(), Some("https://img/t.png"));

        let item: MediaItem = serde_json::from_str(
            r#"{"title":"Lecture 1","url":"x","image":"https://img/i.png","thumbnail":"https://img/t.png"}"#,
        )
        .unwrap();
        assert_eq!(item.artwork(), Some("https://img/i.png"));
    }

    #[test]
    fn test_media_item_ignores_unknown_fields() {
        let item: MediaItem =
            serde_json::from_str(r#"{"title":"T","url":"u","duration":"01:20:00"}"#).unwrap();
        assert_eq!(item, MediaItem::new("T", "u"));
    }
}
