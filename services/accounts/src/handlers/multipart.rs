use std::collections::HashMap;

use axum::extract::Multipart;

use crate::domain::types::MediaUpload;
use crate::error::AccountsServiceError;

/// A fully buffered multipart body: text fields and non-empty file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, MediaUpload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AccountsServiceError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    // Browsers send an empty part for an untouched file input.
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        MediaUpload {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(malformed)?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    /// Text field value, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<MediaUpload> {
        self.files.remove(name)
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AccountsServiceError {
    AccountsServiceError::Validation(format!("malformed multipart body: {}", err.body_text()))
}
