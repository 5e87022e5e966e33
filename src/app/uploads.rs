use crate::model::dtos::UploadFile;

/// Files split by the upload size limit.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub accepted: Vec<UploadFile>,
    pub rejected: Vec<String>,
}

impl UploadBatch {
    /// One line per rejected file, in input order.
    pub fn messages(&self, limit: u64) -> Vec<String> {
        self.rejected
            .iter()
            .map(|name| oversize_message(name, limit))
            .collect()
    }
}

pub fn oversize_message(file_name: &str, limit: u64) -> String {
    format!(
        "File \"{file_name}\" is larger than {} MB and will not be uploaded.",
        limit / (1024 * 1024)
    )
}

/// Keep files of at most `limit` bytes; the rest are reported by name.
pub fn partition_uploads(files: Vec<UploadFile>, limit: u64) -> UploadBatch {
    let mut batch = UploadBatch::default();
    for file in files {
        if file.size() > limit {
            log::warn!("skipping {} ({} bytes)", file.file_name, file.size());
            batch.rejected.push(file.file_name);
        } else {
            batch.accepted.push(file);
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_UPLOAD_BYTES;

    #[test]
    fn oversized_files_are_named() {
        let files = vec![
            UploadFile::new("big.zip", vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize]),
            UploadFile::new("notes.txt", b"hello".to_vec()),
        ];
        let batch = partition_uploads(files, MAX_UPLOAD_BYTES);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].file_name, "notes.txt");
        assert_eq!(
            batch.messages(MAX_UPLOAD_BYTES),
            vec!["File \"big.zip\" is larger than 100 MB and will not be uploaded.".to_string()]
        );
    }

    #[test]
    fn exact_limit_is_accepted() {
        let batch = partition_uploads(vec![UploadFile::new("a", vec![0u8; 4])], 4);
        assert!(batch.rejected.is_empty());
    }
}
