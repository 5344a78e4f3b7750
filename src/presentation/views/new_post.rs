use crate::application::services::PostService;
use crate::domain::entities::ExternalBlob;
use crate::domain::value_objects::PostId;
use crate::presentation::forms::NewPostForm;
use crate::shared::AppError;
use std::sync::Arc;
use tracing::debug;

/// 新規投稿ダイアログ
///
/// The form is checked locally before anything is uploaded. Upload progress is
/// collected while the post is created and kept for display.
pub struct NewPostView {
    posts: Arc<PostService>,
    form: NewPostForm,
    progress: Vec<u8>,
}

impl NewPostView {
    pub fn new(posts: Arc<PostService>) -> Self {
        Self {
            posts,
            form: NewPostForm::default(),
            progress: Vec::new(),
        }
    }

    pub fn form(&self) -> &NewPostForm {
        &self.form
    }

    pub fn select_image(&mut self, content_type: impl Into<String>, blob: ExternalBlob) {
        self.form = std::mem::take(&mut self.form).with_image(content_type, blob);
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.form.caption = caption.into();
    }

    /// Percentages reported by the last submission, in order.
    pub fn progress(&self) -> &[u8] {
        &self.progress
    }

    pub fn latest_progress(&self) -> Option<u8> {
        self.progress.last().copied()
    }

    /// Validates and uploads the post. The form is reset only on success.
    pub async fn submit(&mut self) -> Result<PostId, AppError> {
        let (caption, image) = self.form.clone().into_upload()?;
        let (image, mut progress) = image.with_upload_progress();
        self.progress.clear();

        let collected = &mut self.progress;
        let (result, ()) = tokio::join!(self.posts.create_post(&caption, image), async {
            while let Some(percentage) = progress.next().await {
                debug!(percentage, "upload progress");
                collected.push(percentage);
            }
        });

        let post_id = result?;
        self.form = NewPostForm::default();
        Ok(post_id)
    }
}
