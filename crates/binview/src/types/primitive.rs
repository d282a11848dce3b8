// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive wire types and the process-wide primitive registry.
//!
//! The registry is a `static` table: entries are never mutated, so every
//! data context shares it without synchronization.

/// Static description of a primitive wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveInfo {
    /// Canonical name.
    pub name: &'static str,
    /// Width in bytes (one code unit for text).
    pub width: usize,
    pub is_integer: bool,
    pub is_signed: bool,
    pub is_text: bool,
}

const fn int(name: &'static str, width: usize, is_signed: bool) -> PrimitiveInfo {
    PrimitiveInfo {
        name,
        width,
        is_integer: true,
        is_signed,
        is_text: false,
    }
}

const fn float(name: &'static str, width: usize) -> PrimitiveInfo {
    PrimitiveInfo {
        name,
        width,
        is_integer: false,
        is_signed: true,
        is_text: false,
    }
}

/// Registry, indexed by [`PrimitiveKind::registry_index`].
static PRIMITIVES: [PrimitiveInfo; 11] = [
    int("int8", 1, true),
    int("uint8", 1, false),
    int("int16", 2, true),
    int("uint16", 2, false),
    int("int32", 4, true),
    int("uint32", 4, false),
    int("int64", 8, true),
    int("uint64", 8, false),
    float("float32", 4),
    float("float64", 8),
    PrimitiveInfo {
        name: "text",
        width: 1,
        is_integer: false,
        is_signed: false,
        is_text: true,
    },
];

/// Legacy names accepted by [`PrimitiveKind::from_name`].
static ALIASES: [(&str, PrimitiveKind); 11] = [
    ("byte", PrimitiveKind::I8),
    ("ubyte", PrimitiveKind::U8),
    ("short", PrimitiveKind::I16),
    ("ushort", PrimitiveKind::U16),
    ("int", PrimitiveKind::I32),
    ("uint", PrimitiveKind::U32),
    ("long", PrimitiveKind::I64),
    ("ulong", PrimitiveKind::U64),
    ("float", PrimitiveKind::F32),
    ("double", PrimitiveKind::F64),
    ("char", PrimitiveKind::Text(1)),
];

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Fixed-length text of `n` one-byte code units.
    Text(usize),
}

impl PrimitiveKind {
    /// All scalar (non-text) kinds, in registry order.
    pub const SCALARS: [PrimitiveKind; 10] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    fn registry_index(self) -> usize {
        match self {
            Self::I8 => 0,
            Self::U8 => 1,
            Self::I16 => 2,
            Self::U16 => 3,
            Self::I32 => 4,
            Self::U32 => 5,
            Self::I64 => 6,
            Self::U64 => 7,
            Self::F32 => 8,
            Self::F64 => 9,
            Self::Text(_) => 10,
        }
    }

    /// Registry entry for this kind.
    pub fn info(self) -> &'static PrimitiveInfo {
        &PRIMITIVES[self.registry_index()]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Size in bytes on the wire.
    pub fn size(self) -> usize {
        match self {
            Self::Text(len) => len * self.info().width,
            _ => self.info().width,
        }
    }

    pub fn is_integer(self) -> bool {
        self.info().is_integer
    }

    pub fn is_signed(self) -> bool {
        self.info().is_signed
    }

    pub fn is_text(self) -> bool {
        self.info().is_text
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Look up a kind by canonical name or legacy alias.
    ///
    /// `text` has no intrinsic length and resolves to `Text(1)`.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(kind) = Self::SCALARS.iter().find(|k| k.name() == name) {
            return Some(*kind);
        }
        if name == "text" {
            return Some(Self::Text(1));
        }
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, kind)| *kind)
    }
}
