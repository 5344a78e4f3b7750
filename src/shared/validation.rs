use crate::shared::error::AppError;
use std::fmt;
use std::str::FromStr;

/// バリデーション失敗の分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFailureKind {
    /// 汎用的なバリデーションエラー。
    Generic,
    /// 必須項目（表示名・コメント本文・画像など）が空。
    RequiredFieldMissing,
    /// 画像以外のファイルが投稿に添付された。
    UnsupportedMediaType,
}

impl ValidationFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationFailureKind::Generic => "generic",
            ValidationFailureKind::RequiredFieldMissing => "required_field_missing",
            ValidationFailureKind::UnsupportedMediaType => "unsupported_media_type",
        }
    }
}

impl fmt::Display for ValidationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationFailureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(ValidationFailureKind::Generic),
            "required_field_missing" => Ok(ValidationFailureKind::RequiredFieldMissing),
            "unsupported_media_type" => Ok(ValidationFailureKind::UnsupportedMediaType),
            _ => Err(()),
        }
    }
}

/// Trims and requires a non-empty value.
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(
            ValidationFailureKind::RequiredFieldMissing,
            format!("{field} is required"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_display_name(display_name: &str) -> Result<String, AppError> {
    require_text("display name", display_name)
}

pub fn validate_comment_text(text: &str) -> Result<String, AppError> {
    require_text("comment text", text)
}

pub fn validate_image_content_type(content_type: &str) -> Result<(), AppError> {
    if content_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(AppError::validation(
            ValidationFailureKind::UnsupportedMediaType,
            format!("Unsupported media type: {content_type}"),
        ))
    }
}
