//! Host platform detection
//!
//! The native-binary assertions need to know which executable format the host
//! toolchain is expected to produce (Mach-O on macOS, ELF elsewhere).

use std::fmt;

use serde::Serialize;

use crate::inspect::ArtifactKind;

/// Operating system family of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Os {
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    Windows,
    Other,
}

impl Os {
    fn from_system(system: &str) -> Self {
        match system {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::MacOs,
            "windows" => Os::Windows,
            _ => Os::Other,
        }
    }

    /// The artifact kind a native toolchain emits on this OS.
    ///
    /// Windows has no recognized native format (PE is not inspected), so `None`.
    pub fn native_artifact_kind(self) -> Option<ArtifactKind> {
        match self {
            Os::MacOs => Some(ArtifactKind::MachO),
            Os::Linux | Os::Other => Some(ArtifactKind::Elf),
            Os::Windows => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "macos",
            Os::Windows => "windows",
            Os::Other => "other",
        }
    }
}

/// CPU architecture of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86_64,
    Arm64,
    X86,
    Arm,
    Other,
}

impl Arch {
    fn from_machine(machine: &str) -> Self {
        match machine {
            "x86_64" | "amd64" => Arch::X86_64,
            "aarch64" | "arm64" => Arch::Arm64,
            "x86" | "i386" | "i686" => Arch::X86,
            m if m == "arm" || m.starts_with("armv7") => Arch::Arm,
            _ => Arch::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
            Arch::X86 => "x86",
            Arch::Arm => "arm",
            Arch::Other => "other",
        }
    }
}

/// Detected host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub os: Os,
    pub arch: Arch,
    /// Raw machine string (`std::env::consts::ARCH`)
    pub machine: String,
    /// Raw system string (`std::env::consts::OS`)
    pub system: String,
}

impl PlatformInfo {
    /// Detect the platform this process runs on.
    pub fn detect() -> Self {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build platform info from raw system/machine strings (case-insensitive).
    pub fn from_parts(system: &str, machine: &str) -> Self {
        let system = system.to_ascii_lowercase();
        let machine = machine.to_ascii_lowercase();
        Self {
            os: Os::from_system(&system),
            arch: Arch::from_machine(&machine),
            machine,
            system,
        }
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({}/{})", self.os.as_str(), self.arch.as_str(), self.system, self.machine)
    }
}
