use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::ApiError;

/// The site has a closed set of editable sections, each with a known
/// shape; updates deserialize into the matching struct instead of
/// merging arbitrary keys.
pub const SECTIONS: [&str; 4] = ["hero", "about", "contact", "services"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub primary_button: String,
    pub secondary_button: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AboutStats {
    pub happy_brides: String,
    pub years_experience: String,
    pub certification: String,
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AboutContent {
    pub title: String,
    pub description: String,
    pub stats: AboutStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SocialLinks {
    pub instagram: String,
    pub youtube: String,
    pub whatsapp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactContent {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub social_media: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServicesIntro {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
    Hero(HeroContent),
    About(AboutContent),
    Contact(ContactContent),
    Services(ServicesIntro),
}

/// Deserializes an update body against the shape the section name
/// demands; unknown sections and mismatched bodies are both client
/// errors.
pub fn parse_section(section: &str, body: Value) -> Result<SectionContent, ApiError> {
    let parsed = match section {
        "hero" => serde_json::from_value(body).map(SectionContent::Hero),
        "about" => serde_json::from_value(body).map(SectionContent::About),
        "contact" => serde_json::from_value(body).map(SectionContent::Contact),
        "services" => serde_json::from_value(body).map(SectionContent::Services),
        _ => return Err(ApiError::NotFound("Content")),
    };
    parsed.map_err(|e| ApiError::BadRequest(format!("Invalid {section} content: {e}")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub section: String,
    pub data: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hero_body_parses() {
        let body = json!({
            "title": "Look your best",
            "subtitle": "Bridal and party makeup",
            "primaryButton": "Book Now",
            "secondaryButton": "View Services",
            "image": "https://media.example.com/hero.jpg"
        });
        let parsed = parse_section("hero", body).expect("hero parses");
        match parsed {
            SectionContent::Hero(hero) => {
                assert_eq!(hero.primary_button, "Book Now");
                assert!(hero.image.is_some());
            }
            other => panic!("expected hero, got {other:?}"),
        }
    }

    #[test]
    fn about_requires_nested_stats() {
        let body = json!({ "title": "About us", "description": "..." });
        assert!(parse_section("about", body).is_err());

        let body = json!({
            "title": "About us",
            "description": "...",
            "stats": {
                "happyBrides": "500+",
                "yearsExperience": "10",
                "certification": "Certified",
                "specialization": "Bridal"
            }
        });
        assert!(parse_section("about", body).is_ok());
    }

    #[test]
    fn unknown_section_is_not_found() {
        let err = parse_section("footer", json!({})).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn stray_keys_are_rejected() {
        let body = json!({
            "title": "t",
            "subtitle": "s",
            "primaryButton": "p",
            "secondaryButton": "q",
            "surprise": true
        });
        assert!(parse_section("hero", body).is_err());
    }
}
