//! Site-wide settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_text};
use crate::types::Email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub facebook: String,
    pub twitter: String,
    pub instagram: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub enable_blog: bool,
    pub enable_newsletter: bool,
    pub enable_reviews: bool,
}

/// The stored settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub description: String,
    pub contact_email: Email,
    pub theme: Theme,
    pub social_media: SocialMedia,
    pub features: Features,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "My E-commerce Site".to_owned(),
            description: "Welcome to our online store".to_owned(),
            contact_email: Email::parse("contact@example.com")
                .unwrap_or_else(|_| unreachable!("literal address is valid")),
            theme: Theme {
                primary_color: "#f97316".to_owned(),
                secondary_color: "#000000".to_owned(),
            },
            social_media: SocialMedia::default(),
            features: Features {
                enable_blog: true,
                enable_newsletter: true,
                enable_reviews: true,
            },
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialMediaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeaturesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_blog: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_newsletter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_reviews: Option<bool>,
}

/// Body of `PUT /api/settings`. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMediaPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesPatch>,
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn check_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_hex_color(value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a hex colour like #f97316"))
    }
}

impl SiteSettings {
    /// Apply a partial update, validating every supplied field first.
    ///
    /// On error the settings are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank name or description, or a
    /// malformed theme colour.
    pub fn apply(&mut self, patch: SiteSettingsPatch) -> Result<(), ValidationError> {
        if let Some(name) = &patch.site_name {
            check_text("siteName", name, Some(100))?;
        }
        if let Some(description) = &patch.description {
            check_text("description", description, Some(500))?;
        }
        if let Some(theme) = &patch.theme {
            if let Some(color) = &theme.primary_color {
                check_color("theme.primaryColor", color)?;
            }
            if let Some(color) = &theme.secondary_color {
                check_color("theme.secondaryColor", color)?;
            }
        }

        if let Some(name) = patch.site_name {
            self.site_name = name.trim().to_owned();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }
        if let Some(email) = patch.contact_email {
            self.contact_email = email;
        }
        if let Some(theme) = patch.theme {
            if let Some(color) = theme.primary_color {
                self.theme.primary_color = color;
            }
            if let Some(color) = theme.secondary_color {
                self.theme.secondary_color = color;
            }
        }
        if let Some(social) = patch.social_media {
            if let Some(link) = social.facebook {
                self.social_media.facebook = link;
            }
            if let Some(link) = social.twitter {
                self.social_media.twitter = link;
            }
            if let Some(link) = social.instagram {
                self.social_media.instagram = link;
            }
        }
        if let Some(features) = patch.features {
            if let Some(flag) = features.enable_blog {
                self.features.enable_blog = flag;
            }
            if let Some(flag) = features.enable_newsletter {
                self.features.enable_newsletter = flag;
            }
            if let Some(flag) = features.enable_reviews {
                self.features.enable_reviews = flag;
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
