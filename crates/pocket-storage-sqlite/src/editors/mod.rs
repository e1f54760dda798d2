//! Record editors
//!
//! An editor owns one draft. Setters refresh the draft's timestamp only when
//! a value really changes; `save` inserts a draft once and afterwards writes
//! only the changed columns. Screen code calls `save_or_log`, which records
//! a failed write and carries on.

pub mod credential;
pub mod note;
pub mod photo;

pub use credential::CredentialEditor;
pub use note::{NoteEditor, NoteField};
pub use photo::PhotoEditor;

use crate::Result;

fn log_save_result(kind: &'static str, result: Result<bool>) -> bool {
    match result {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(kind, error = %e, "Failed to save record");
            false
        }
    }
}
