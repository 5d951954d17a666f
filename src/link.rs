/// Data structures for saved links
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A link record as stored by the links API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Link {
    pub fn new(name: &str, url: &str) -> Link {
        Link {
            id: None,
            name: name.to_string(),
            url: url.to_string(),
            custom_icon: None,
            icon_color: None,
            created_at: None,
        }
    }

    /// The editable fields of this link, used to pre-fill the edit form
    pub fn to_draft(&self) -> LinkDraft {
        LinkDraft {
            name: self.name.clone(),
            url: self.url.clone(),
            custom_icon: self.custom_icon.clone(),
            icon_color: self.icon_color.clone(),
        }
    }
}

/// Request body for creating or replacing a link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkDraft {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
}

impl LinkDraft {
    pub fn new(name: &str, url: &str) -> LinkDraft {
        LinkDraft {
            name: name.to_string(),
            url: url.to_string(),
            ..LinkDraft::default()
        }
    }

    /// Trim `name` and `url`, rejecting the draft if either ends up empty.
    pub fn validate(&self) -> Result<LinkDraft, ApiError> {
        let name = self.name.trim();
        let url = self.url.trim();

        if name.is_empty() || url.is_empty() {
            return Err(ApiError::Validation(
                "Please fill in all required fields.".to_string(),
            ));
        }

        Ok(LinkDraft {
            name: name.to_string(),
            url: url.to_string(),
            custom_icon: self.custom_icon.clone().filter(|icon| !icon.is_empty()),
            icon_color: self.icon_color.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_link() {
        let json = r#"{
            "id": 7,
            "name": "YouTube",
            "url": "https://www.youtube.com",
            "created_at": "2024-10-28T10:30:00"
        }"#;

        let link: Link = serde_json::from_str(json).unwrap();

        assert_eq!(link.id, Some(7));
        assert_eq!(link.name, "YouTube");
        assert_eq!(link.custom_icon, None);
        assert_eq!(link.created_at.as_deref(), Some("2024-10-28T10:30:00"));
    }

    #[test]
    fn test_draft_omits_missing_icon_fields() {
        let draft = LinkDraft::new("Netflix", "https://www.netflix.com");
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"name": "Netflix", "url": "https://www.netflix.com"})
        );
    }

    #[test]
    fn test_validate_trims_fields() {
        let draft = LinkDraft::new("  GitHub ", " https://github.com  ");
        let valid = draft.validate().unwrap();

        assert_eq!(valid.name, "GitHub");
        assert_eq!(valid.url, "https://github.com");
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(LinkDraft::new("   ", "https://github.com").validate().is_err());
        assert!(LinkDraft::new("GitHub", "\t").validate().is_err());
        assert!(LinkDraft::new("", "").validate().is_err());
    }

    #[test]
    fn test_validate_drops_empty_custom_icon() {
        let mut draft = LinkDraft::new("Mail", "https://mail.example.com");
        draft.custom_icon = Some(String::new());

        assert_eq!(draft.validate().unwrap().custom_icon, None);
    }

    #[test]
    fn test_to_draft_keeps_icon_fields() {
        let mut link = Link::new("TV", "https://tv.example.com");
        link.id = Some(3);
        link.custom_icon = Some("bi-tv".to_string());
        link.icon_color = Some("#ff0000".to_string());

        let draft = link.to_draft();

        assert_eq!(draft.custom_icon.as_deref(), Some("bi-tv"));
        assert_eq!(draft.icon_color.as_deref(), Some("#ff0000"));
    }
}
