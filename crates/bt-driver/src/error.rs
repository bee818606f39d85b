use bt_decoder::DecodeError;

/// Errors that can occur while rendering or running a session.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Variant      │ Cause                                            │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ UnknownMode  │ output mode name not recognised                  │
/// │ Decode       │ the decoder failed mid-session                   │
/// │ Json         │ JSON serialisation failed                        │
/// │ Io           │ writing rendered output failed                   │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("unknown output mode {name:?} (expected compact, tree or json)")]
    UnknownMode { name: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
