use crate::shared::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const DATA_URL_PREFIX: &str = "data:application/octet-stream;base64,";

#[derive(Clone, PartialEq, Eq)]
enum BlobSource {
    Url(String),
    Bytes(Bytes),
}

/// 画像などのバイナリを指す不透明なハンドル。
///
/// The handle wraps either a remote URL or raw bytes. Upload progress is
/// delivered through an [`UploadProgress`] subscription registered with
/// [`ExternalBlob::with_upload_progress`] before the blob is submitted.
#[derive(Clone)]
pub struct ExternalBlob {
    source: BlobSource,
    progress: Option<Arc<ProgressSink>>,
}

struct ProgressSink {
    sender: Mutex<Option<mpsc::UnboundedSender<u8>>>,
}

impl ProgressSink {
    fn send(&self, percentage: u8) {
        if let Ok(guard) = self.sender.lock() {
            if let Some(sender) = guard.as_ref() {
                // 購読側が破棄済みでも送信失敗は無視する
                let _ = sender.send(percentage);
            }
        }
    }

    fn close(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }
}

impl ExternalBlob {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: BlobSource::Url(url.into()),
            progress: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            source: BlobSource::Bytes(bytes.into()),
            progress: None,
        }
    }

    /// Registers an upload progress observer, replacing any earlier one.
    pub fn with_upload_progress(mut self) -> (Self, UploadProgress) {
        let (sender, receiver) = mpsc::unbounded_channel();
        if let Some(previous) = self.progress.take() {
            previous.close();
        }
        self.progress = Some(Arc::new(ProgressSink {
            sender: Mutex::new(Some(sender)),
        }));
        (self, UploadProgress { receiver })
    }

    pub fn has_upload_observer(&self) -> bool {
        self.progress.is_some()
    }

    /// Reports upload progress, clamped to 0..=100.
    pub fn report_upload_progress(&self, percentage: u8) {
        if let Some(sink) = &self.progress {
            sink.send(percentage.min(100));
        }
    }

    /// Ends the progress subscription after a successful upload.
    pub fn finish_upload(&self) {
        if let Some(sink) = &self.progress {
            sink.send(100);
            sink.close();
        }
    }

    /// Ends the progress subscription without a final 100% event.
    pub fn fail_upload(&self) {
        if let Some(sink) = &self.progress {
            sink.close();
        }
    }

    /// A copy of the handle without the progress observer, as stored remotely.
    pub fn detached(&self) -> Self {
        Self {
            source: self.source.clone(),
            progress: None,
        }
    }

    pub fn direct_url(&self) -> String {
        match &self.source {
            BlobSource::Url(url) => url.clone(),
            BlobSource::Bytes(bytes) => format!("{DATA_URL_PREFIX}{}", STANDARD.encode(bytes)),
        }
    }

    pub async fn get_bytes(&self) -> Result<Bytes, AppError> {
        match &self.source {
            BlobSource::Bytes(bytes) => Ok(bytes.clone()),
            BlobSource::Url(url) => match decode_data_url(url) {
                Some(decoded) => decoded,
                None => Err(AppError::Network(format!(
                    "Remote blob fetch is not available for {url}"
                ))),
            },
        }
    }

    pub fn len_hint(&self) -> Option<usize> {
        match &self.source {
            BlobSource::Bytes(bytes) => Some(bytes.len()),
            BlobSource::Url(_) => None,
        }
    }
}

fn decode_data_url(url: &str) -> Option<Result<Bytes, AppError>> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(
        STANDARD
            .decode(payload)
            .map(Bytes::from)
            .map_err(AppError::from),
    )
}

impl PartialEq for ExternalBlob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for ExternalBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            BlobSource::Url(url) => f.debug_tuple("ExternalBlob::Url").field(url).finish(),
            BlobSource::Bytes(bytes) => f
                .debug_struct("ExternalBlob::Bytes")
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Upload progress subscription; yields percentages until the upload ends.
pub struct UploadProgress {
    receiver: mpsc::UnboundedReceiver<u8>,
}

impl UploadProgress {
    /// 次の進捗を待つ。アップロード完了・失敗後は `None`。
    pub async fn next(&mut self) -> Option<u8> {
        self.receiver.recv().await
    }

    /// Drains buffered events and returns the most recent percentage.
    pub fn latest(&mut self) -> Option<u8> {
        let mut latest = None;
        while let Ok(value) = self.receiver.try_recv() {
            latest = Some(value);
        }
        latest
    }
}
