//! Note and document ingestion forms.
//!
//! The two forms are independent: each validates its own input and owns its
//! own [`Operation`]. Input is cleared after a successful upload and kept
//! after a failure so it can be corrected. Input edited while the upload was
//! in flight is not what was sent, so it is kept too.

use tracing::{debug, instrument};

use kbdesk_core::{
    DocumentFile, DocumentUploadResponse, Error, IngestionBackend, NoteUpload,
    NoteUploadResponse, NoticeBus, Result, ValidationError,
};

use crate::operation::{Operation, OperationStatus, Settlement, Submission, Ticket};

// =============================================================================
// NOTES
// =============================================================================

pub struct NoteForm {
    title: String,
    content: String,
    upload: Operation<NoteUpload, NoteUploadResponse>,
    notices: NoticeBus,
}

impl NoteForm {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            upload: Operation::new("upload_note"),
            notices,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn status(&self) -> OperationStatus {
        self.upload.status()
    }

    pub fn note_id(&self) -> Option<&str> {
        self.upload.result().and_then(|r| r.note_id.as_deref())
    }

    pub fn can_upload(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.content.trim().is_empty()
            && self.upload.can_submit()
    }

    pub fn begin(&mut self) -> Result<Submission<NoteUpload>> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            let err = ValidationError::IncompleteNote;
            self.notices.error(err.to_string());
            return Err(err.into());
        }

        let request = NoteUpload {
            title: self.title.clone(),
            content: self.content.clone(),
        };
        let ticket = self.upload.begin(request.clone())?;
        Ok(Submission { ticket, request })
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: Result<NoteUploadResponse>) -> Settlement {
        let outcome = outcome.and_then(|response| {
            if response.accepted {
                Ok(response)
            } else {
                Err(Error::Operation("note was not accepted".to_string()))
            }
        });

        let settlement = self.upload.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                let unchanged = self
                    .upload
                    .input()
                    .is_some_and(|sent| sent.title == self.title && sent.content == self.content);
                if unchanged {
                    self.title.clear();
                    self.content.clear();
                } else {
                    debug!("Note edited during upload, keeping fields");
                }
                self.notices.success("Note uploaded successfully!");
            }
            Settlement::Failed => {
                if let Some(err) = self.upload.error() {
                    self.notices.error(err.to_string());
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "upload"))]
    pub async fn submit<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: IngestionBackend + ?Sized,
    {
        let submission = self.begin()?;
        let outcome = backend.upload_note(&submission.request).await;
        Ok(self.settle(submission.ticket, outcome))
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.content.clear();
        self.upload.reset();
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

pub struct DocumentPicker {
    files: Vec<DocumentFile>,
    upload: Operation<Vec<DocumentFile>, DocumentUploadResponse>,
    notices: NoticeBus,
}

impl DocumentPicker {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            files: Vec::new(),
            upload: Operation::new("upload_documents"),
            notices,
        }
    }

    pub fn files(&self) -> &[DocumentFile] {
        &self.files
    }

    pub fn status(&self) -> OperationStatus {
        self.upload.status()
    }

    pub fn document_ids(&self) -> Option<&[String]> {
        self.upload
            .result()
            .and_then(|r| r.document_ids.as_deref())
    }

    /// Replace the selection, keeping only PDFs. Returns how many were kept.
    pub fn select_files(&mut self, files: Vec<DocumentFile>) -> usize {
        let (pdfs, rejected): (Vec<_>, Vec<_>) = files.into_iter().partition(DocumentFile::is_pdf);
        if !rejected.is_empty() {
            let names: Vec<&str> = rejected.iter().map(|f| f.file_name.as_str()).collect();
            debug!(rejected = rejected.len(), "Non-PDF files dropped from selection");
            self.notices
                .error(format!("Only PDF files are supported: {}", names.join(", ")));
        }
        self.files = pdfs;
        self.files.len()
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.upload.reset();
    }

    pub fn can_upload(&self) -> bool {
        !self.files.is_empty() && self.upload.can_submit()
    }

    pub fn begin(&mut self) -> Result<Submission<Vec<DocumentFile>>> {
        if self.files.is_empty() {
            let err = ValidationError::NoFilesSelected;
            self.notices.error(err.to_string());
            return Err(err.into());
        }

        let request = self.files.clone();
        let ticket = self.upload.begin(request.clone())?;
        Ok(Submission { ticket, request })
    }

    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<DocumentUploadResponse>,
    ) -> Settlement {
        let outcome = outcome.and_then(|response| {
            if response.accepted {
                Ok(response)
            } else {
                Err(Error::Operation("documents were not accepted".to_string()))
            }
        });

        let settlement = self.upload.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                let count = self.upload.result().map(|r| r.count).unwrap_or_default();
                if self.upload.input() == Some(&self.files) {
                    self.files.clear();
                } else {
                    debug!("Selection changed during upload, keeping it");
                }
                self.notices
                    .success(format!("{} PDF(s) uploaded successfully!", count));
            }
            Settlement::Failed => {
                if let Some(err) = self.upload.error() {
                    self.notices.error(err.to_string());
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(
        skip(self, backend),
        fields(subsystem = "workspace", component = "upload", file_count = self.files.len())
    )]
    pub async fn submit<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: IngestionBackend + ?Sized,
    {
        let submission = self.begin()?;
        let outcome = backend.upload_documents(&submission.request).await;
        Ok(self.settle(submission.ticket, outcome))
    }
}
