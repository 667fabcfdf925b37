use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
}

/// Partial update. An empty `color` removes the tag's color.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_color_or_empty"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetNoteTagsRequest {
    #[validate(length(max = 50))]
    pub tag_ids: Vec<Uuid>,
}

/// Accepts `#RRGGBB`.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::new("color"))?;
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("color"))
    }
}

fn validate_color_or_empty(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() {
        return Ok(());
    }
    validate_color(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#1a2B3c").is_ok());
        assert!(validate_color("1a2b3c").is_err());
        assert!(validate_color("#1a2b3").is_err());
        assert!(validate_color("#gggggg").is_err());
    }

    #[test]
    fn test_create_tag_validation() {
        let ok = CreateTagRequest {
            name: "work".into(),
            color: Some("#ff8800".into()),
        };
        assert!(ok.validate().is_ok());

        let empty_name = CreateTagRequest {
            name: String::new(),
            color: None,
        };
        assert!(empty_name.validate().is_err());

        let bad_color = CreateTagRequest {
            name: "home".into(),
            color: Some("orange".into()),
        };
        assert!(bad_color.validate().is_err());
    }

    #[test]
    fn test_update_tag_allows_clearing_color() {
        let clear = UpdateTagRequest {
            name: None,
            color: Some(String::new()),
        };
        assert!(clear.validate().is_ok());
    }

    #[test]
    fn test_set_note_tags_limit() {
        let too_many = SetNoteTagsRequest {
            tag_ids: (0..51).map(|_| Uuid::new_v4()).collect(),
        };
        assert!(too_many.validate().is_err());
    }
}
