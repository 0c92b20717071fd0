use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("negative question count {value} for student {student}")]
    NegativeQuestions { student: String, value: i32 },

    #[error("no data source: pass --snapshot or set DATABASE_URL")]
    NoSource,
}
