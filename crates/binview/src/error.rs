// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the type model, the I/O layer and the instances.

use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by binview.
///
/// Nothing is retried internally. Use [`Error::kind`] to tell a bad layout
/// apart from a short file, a navigation mistake or a failing device.
#[derive(Debug, Error)]
pub enum Error {
    /// Type descriptor rejected at construction time.
    #[error("Malformed type: {0}")]
    MalformedType(String),

    /// A member's size depends on a field whose offset depends on that member.
    #[error("Cyclic layout dependency in '{type_name}' while resolving member '{member}'")]
    CyclicDependency { type_name: String, member: String },

    /// The handler returned fewer bytes than the layout requires.
    #[error("Truncated data at offset {offset}: need {expected} bytes, got {actual}")]
    TruncatedData {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// Readable but nonsensical data, e.g. a negative element count.
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Index out of range: {index} (element count {count})")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Data context is closed")]
    ContextClosed,

    /// Handler failure, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedType,
    TruncatedData,
    CorruptData,
    OutOfRange,
    InvalidAccess,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedType(_) | Self::CyclicDependency { .. } => ErrorKind::MalformedType,
            Self::TruncatedData { .. } => ErrorKind::TruncatedData,
            Self::CorruptData(_) => ErrorKind::CorruptData,
            Self::MemberNotFound(_) | Self::IndexOutOfRange { .. } => ErrorKind::OutOfRange,
            Self::TypeMismatch { .. } => ErrorKind::InvalidAccess,
            Self::ContextClosed | Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.kind() == ErrorKind::TruncatedData
    }

    pub fn is_out_of_range(&self) -> bool {
        self.kind() == ErrorKind::OutOfRange
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedType(msg.into())
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
