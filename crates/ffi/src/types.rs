//! FFI-safe types for UniFFI export.
//!
//! These mirror the core types without `DateTime<Utc>` or generic
//! parameters, which UniFFI cannot carry.

use chronostamp_core::{Edit, MatchResult, OutputTag};

#[derive(uniffi::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutputTag {
    LongDateTime,
    ShortDateTime,
    LongDate,
    ShortDate,
    LongTime,
    ShortTime,
}

impl From<OutputTag> for FfiOutputTag {
    fn from(t: OutputTag) -> Self {
        match t {
            OutputTag::LongDateTime => Self::LongDateTime,
            OutputTag::ShortDateTime => Self::ShortDateTime,
            OutputTag::LongDate => Self::LongDate,
            OutputTag::ShortDate => Self::ShortDate,
            OutputTag::LongTime => Self::LongTime,
            OutputTag::ShortTime => Self::ShortTime,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiMatch {
    pub matched_text: String,
    pub epoch_seconds: i64,
    pub tag: FfiOutputTag,
    /// Single-character tag code, e.g. `"F"`.
    pub tag_code: String,
    pub variant: String,
    pub markup: String,
}

impl From<MatchResult> for FfiMatch {
    fn from(r: MatchResult) -> Self {
        Self {
            markup: r.markup(),
            epoch_seconds: r.epoch_seconds(),
            tag: r.output_tag.into(),
            tag_code: r.output_tag.code().to_string(),
            matched_text: r.matched_text,
            variant: r.variant,
        }
    }
}

/// Edit the host applies to its editor.
#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiEdit {
    pub selection: String,
    pub matched_text: String,
    pub markup: String,
    /// `selection` with `matched_text` replaced by `markup`.
    pub spliced: String,
}

impl From<Edit> for FfiEdit {
    fn from(e: Edit) -> Self {
        Self {
            spliced: e.spliced(),
            selection: e.selection,
            matched_text: e.matched,
            markup: e.markup,
        }
    }
}

/// A listener change the host must perform on one of its targets.
#[derive(uniffi::Enum, Debug, Clone, PartialEq, Eq)]
pub enum FfiListenerChange {
    Attach { target: String },
    Detach { target: String },
}

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("settings store error: {message}")]
    Store { message: String },
}

impl From<chronostamp_core::StoreError> for FfiError {
    fn from(e: chronostamp_core::StoreError) -> Self {
        Self::Store {
            message: e.to_string(),
        }
    }
}
