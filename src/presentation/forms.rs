use crate::domain::entities::ExternalBlob;
use crate::shared::validation::{
    validate_comment_text, validate_display_name, validate_image_content_type,
};
use crate::shared::{AppError, ValidationFailureKind};
use serde::Deserialize;

/// フォーム入力の検証。失敗時はリモート呼び出し前に止める
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

// プロフィール作成・編集
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
}

impl ProfileForm {
    pub fn new(display_name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            bio: bio.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.trim()
    }

    pub fn bio(&self) -> &str {
        self.bio.trim()
    }
}

impl Validate for ProfileForm {
    fn validate(&self) -> Result<(), AppError> {
        validate_display_name(&self.display_name).map(|_| ())
    }
}

/// Image selected for a new post, with the content type reported by the picker.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub content_type: String,
    pub blob: ExternalBlob,
}

#[derive(Debug, Clone, Default)]
pub struct NewPostForm {
    pub image: Option<SelectedImage>,
    pub caption: String,
}

impl NewPostForm {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            image: None,
            caption: caption.into(),
        }
    }

    pub fn with_image(mut self, content_type: impl Into<String>, blob: ExternalBlob) -> Self {
        self.image = Some(SelectedImage {
            content_type: content_type.into(),
            blob,
        });
        self
    }

    pub fn caption(&self) -> &str {
        self.caption.trim()
    }

    /// Validates and hands back the image to upload.
    pub fn into_upload(self) -> Result<(String, ExternalBlob), AppError> {
        self.validate()?;
        let caption = self.caption().to_string();
        match self.image {
            Some(image) => Ok((caption, image.blob)),
            None => Err(missing_image()),
        }
    }
}

impl Validate for NewPostForm {
    fn validate(&self) -> Result<(), AppError> {
        let image = self.image.as_ref().ok_or_else(missing_image)?;
        validate_image_content_type(&image.content_type)
    }
}

fn missing_image() -> AppError {
    AppError::validation(
        ValidationFailureKind::RequiredFieldMissing,
        "Please select an image",
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }
}

impl Validate for CommentForm {
    fn validate(&self) -> Result<(), AppError> {
        validate_comment_text(&self.text).map(|_| ())
    }
}
