//! Artifact inspection by header bytes
//!
//! Compilers rarely produce files with meaningful extensions, so the kind of an
//! output artifact is decided from its first bytes only.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How many header bytes are read for classification.
pub const HEADER_PREFIX_LEN: usize = 64;

const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
const LLVM_BITCODE_MAGIC: [u8; 4] = [b'B', b'C', 0xC0, 0xDE];

/// Mach-O thin (32/64-bit) and fat magics, both byte orders.
const MACHO_MAGICS: [u32; 6] = [0xFEED_FACE, 0xFEED_FACF, 0xCAFE_BABE, 0xCEFA_EDFE, 0xCFFA_EDFE, 0xBEBA_FECA];

/// Kind of a compiler output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Elf,
    #[serde(rename = "macho")]
    MachO,
    LlvmBitcode,
    LlvmIrText,
    Unknown,
}

impl ArtifactKind {
    /// True for formats a native toolchain links executables into.
    pub fn is_native(self) -> bool {
        matches!(self, ArtifactKind::Elf | ArtifactKind::MachO)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Elf => "ELF",
            ArtifactKind::MachO => "MACHO",
            ArtifactKind::LlvmBitcode => "LLVM_BITCODE",
            ArtifactKind::LlvmIrText => "LLVM_IR_TEXT",
            ArtifactKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Classify a header prefix.
///
/// Only the first [`HEADER_PREFIX_LEN`] bytes are considered; shorter inputs are
/// fine and simply match fewer rules.
pub fn classify_header(data: &[u8]) -> ArtifactKind {
    let data = &data[..data.len().min(HEADER_PREFIX_LEN)];

    if let Some(magic) = data.first_chunk::<4>() {
        if *magic == ELF_MAGIC {
            return ArtifactKind::Elf;
        }
        // The magic table holds both byte orders, so a big-endian read covers both.
        if MACHO_MAGICS.contains(&u32::from_be_bytes(*magic)) {
            return ArtifactKind::MachO;
        }
        if *magic == LLVM_BITCODE_MAGIC {
            return ArtifactKind::LlvmBitcode;
        }
    }

    if looks_like_llvm_ir(data) {
        return ArtifactKind::LlvmIrText;
    }

    ArtifactKind::Unknown
}

fn looks_like_llvm_ir(data: &[u8]) -> bool {
    let text = String::from_utf8_lossy(data);
    let head = text.trim_start();
    if head.starts_with("; ModuleID =") || head.starts_with("source_filename") {
        return true;
    }
    let window: String = head.chars().take(120).collect();
    window.contains("target triple")
}

fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(HEADER_PREFIX_LEN);
    file.take(HEADER_PREFIX_LEN as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read the header of `path` and classify it.
///
/// ## Errors
///
/// Returns the underlying I/O error when the file cannot be opened or read.
pub fn detect_artifact_kind(path: &Path) -> io::Result<ArtifactInfo> {
    let data = read_prefix(path)?;
    Ok(ArtifactInfo {
        path: path.to_path_buf(),
        kind: classify_header(&data),
    })
}
