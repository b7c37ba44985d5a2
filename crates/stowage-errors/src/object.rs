use thiserror::Error;

/// Failures reported by the object layer.
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Bucket not empty: {bucket}")]
    BucketNotEmpty { bucket: String },

    #[error("Bucket exists: {bucket}")]
    BucketExists { bucket: String },

    #[error("Object not found: {bucket}#{object}")]
    ObjectNotFound { bucket: String, object: String },

    #[error("Object exists on : {bucket} as directory {object}")]
    ObjectExistsAsDirectory { bucket: String, object: String },

    #[error("No bucket policy found for bucket: {bucket}")]
    BucketPolicyNotFound { bucket: String },

    #[error("Invalid upload id {upload_id}")]
    InvalidUploadId { upload_id: String },

    #[error("Bucket name invalid: {bucket}")]
    BucketNameInvalid { bucket: String },

    #[error("Object name invalid: {bucket}#{object}")]
    ObjectNameInvalid { bucket: String, object: String },

    #[error("disk not found: {path}")]
    DiskNotFound { path: String },

    #[error("Storage reached its minimum free disk threshold.")]
    StorageFull,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObjectError {
    /// Expected outcomes of normal request handling. These are reported to
    /// the client and must never show up in the server log.
    pub fn is_ignorable(&self) -> bool {
        match self {
            ObjectError::BucketNotFound { .. }
            | ObjectError::BucketNotEmpty { .. }
            | ObjectError::BucketExists { .. } => true,
            ObjectError::ObjectNotFound { .. } | ObjectError::ObjectExistsAsDirectory { .. } => {
                true
            }
            ObjectError::BucketPolicyNotFound { .. } | ObjectError::InvalidUploadId { .. } => true,
            ObjectError::BucketNameInvalid { .. }
            | ObjectError::ObjectNameInvalid { .. }
            | ObjectError::DiskNotFound { .. }
            | ObjectError::StorageFull
            | ObjectError::Io(_) => false,
        }
    }
}
