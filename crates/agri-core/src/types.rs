use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One news result as returned by the search provider.
///
/// Only `title` is interpreted; every other provider field (`link`,
/// `source`, `date`, `snippet`, `thumbnail`, `position`, ...) is carried
/// through untouched in `extra`. `search_date` is the calendar day
/// (`YYYY-MM-DD`, Jakarta time) the result was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default)]
    pub search_date: String,
}

impl NewsItem {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            extra: Map::new(),
            search_date: String::new(),
        }
    }
}

/// Historical production figures for one year. A figure stored as null
/// stays `None` and serializes back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub tahun: i32,
    pub produksi: Option<f64>,
    pub produktivitas: Option<f64>,
    pub tanaman_menghasilkan: Option<f64>,
}

impl ExistingRecord {
    /// A year with no production, no productivity and no harvested area
    /// carries no data. Null is not zero.
    pub fn is_empty(&self) -> bool {
        [self.produksi, self.produktivitas, self.tanaman_menghasilkan]
            .iter()
            .all(|value| *value == Some(0.0))
    }
}

/// Forecast production for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub tahun: i32,
    pub produksi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_news_item_keeps_provider_fields() {
        let raw = json!({
            "position": 1,
            "title": "Harga cabai naik",
            "link": "https://example.com/cabai",
            "source": "Berita Tani",
        });

        let mut item: NewsItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.title.as_deref(), Some("Harga cabai naik"));
        assert!(item.search_date.is_empty());

        item.search_date = "2024-05-01".to_string();
        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["link"], "https://example.com/cabai");
        assert_eq!(out["position"], 1);
        assert_eq!(out["search_date"], "2024-05-01");
    }

    #[test]
    fn test_news_item_without_title() {
        let item: NewsItem = serde_json::from_value(json!({"link": "x"})).unwrap();
        assert!(item.title.is_none());
        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("title").is_none());
    }

    #[test]
    fn test_existing_record_all_zero_is_empty() {
        let mut record = ExistingRecord {
            tahun: 2020,
            produksi: Some(0.0),
            produktivitas: Some(0.0),
            tanaman_menghasilkan: Some(0.0),
        };
        assert!(record.is_empty());

        record.produktivitas = Some(1.5);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_existing_record_with_null_is_kept() {
        let record = ExistingRecord {
            tahun: 2020,
            produksi: None,
            produktivitas: Some(0.0),
            tanaman_menghasilkan: Some(0.0),
        };
        assert!(!record.is_empty());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(
            out,
            json!({"tahun": 2020, "produksi": null, "produktivitas": 0.0, "tanaman_menghasilkan": 0.0})
        );
    }

    #[test]
    fn test_chat_role_serializes_lowercase() {
        let msg = ChatMessage::system("halo");
        let out = serde_json::to_value(&msg).unwrap();
        assert_eq!(out, json!({"role": "system", "content": "halo"}));
    }
}
