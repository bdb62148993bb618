//! Build variant model
//!
//! A variant is one cell of the build matrix: target OS, compiler,
//! build type, architecture, and the library-shape options (shared vs
//! static, position-independent code). Two variants with identical field
//! values produce identical canonical keys, so the key is usable for
//! build-directory scoping and cache lookups.

use kiln_errors::RecipeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    /// Detect the host operating system
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Whether dynamic-link artifacts live in `bin/` on this platform
    #[must_use]
    pub fn uses_bin_for_dylibs(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Macos => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for Os {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            _ => Err(RecipeError::InvalidSetting {
                setting: "os".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl Compiler {
    /// Detect a reasonable default compiler for the host
    #[must_use]
    pub fn host_default(os: Os) -> Self {
        match os {
            Os::Linux => Self::Gcc,
            Os::Macos => Self::AppleClang,
            Os::Windows => Self::Msvc,
        }
    }

    /// C and C++ compiler executables for this family
    #[must_use]
    pub fn toolchain(self) -> (&'static str, &'static str) {
        match self {
            Self::Gcc => ("gcc", "g++"),
            Self::Clang | Self::AppleClang => ("clang", "clang++"),
            Self::Msvc => ("cl", "cl"),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcc => write!(f, "gcc"),
            Self::Clang => write!(f, "clang"),
            Self::AppleClang => write!(f, "apple-clang"),
            Self::Msvc => write!(f, "msvc"),
        }
    }
}

impl FromStr for Compiler {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "apple-clang" | "appleclang" => Ok(Self::AppleClang),
            "msvc" => Ok(Self::Msvc),
            _ => Err(RecipeError::InvalidSetting {
                setting: "compiler".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "armv7")]
    Armv7,
}

impl Arch {
    /// Detect the host architecture
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_arch = "aarch64") {
            Self::Arm64
        } else if cfg!(target_arch = "arm") {
            Self::Armv7
        } else {
            Self::X86_64
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => write!(f, "x86_64"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Armv7 => write!(f, "armv7"),
        }
    }
}

impl FromStr for Arch {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "armv7" => Ok(Self::Armv7),
            _ => Err(RecipeError::InvalidSetting {
                setting: "arch".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Build type passed through to the underlying build system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Spelling used by CMake-style tools
    #[must_use]
    pub fn as_cmake(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl Default for BuildType {
    fn default() -> Self {
        Self::Release
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
            Self::RelWithDebInfo => write!(f, "relwithdebinfo"),
            Self::MinSizeRel => write!(f, "minsizerel"),
        }
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            _ => Err(RecipeError::InvalidSetting {
                setting: "build_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Library shape derived from the `shared` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryShape {
    Shared,
    Static,
}

impl fmt::Display for LibraryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// One fully-specified cell of the build matrix
///
/// Immutable once constructed. `fPIC` is only meaningful for static
/// builds; shared builds are position-independent by construction and
/// the flag is carried but ignored by driver translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub os: Os,
    pub compiler: Compiler,
    pub build_type: BuildType,
    pub arch: Arch,
    pub shared: bool,
    #[serde(rename = "fPIC")]
    pub fpic: bool,
}

impl VariantKey {
    /// Create a variant for the host platform with the given options
    #[must_use]
    pub fn host(build_type: BuildType, shared: bool, fpic: bool) -> Self {
        let os = Os::host();
        Self {
            os,
            compiler: Compiler::host_default(os),
            build_type,
            arch: Arch::host(),
            shared,
            fpic,
        }
    }

    /// Library shape implied by the `shared` option
    #[must_use]
    pub fn shape(&self) -> LibraryShape {
        if self.shared {
            LibraryShape::Shared
        } else {
            LibraryShape::Static
        }
    }

    /// Canonical key string, stable across invocations
    ///
    /// Identical field values always produce identical keys, so the key
    /// is safe to use for build-directory naming and cache lookups.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut key = format!(
            "{}-{}-{}-{}-{}",
            self.os,
            self.compiler,
            self.build_type,
            self.arch,
            self.shape()
        );
        if !self.shared && self.fpic {
            key.push_str("-pic");
        }
        key
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}

/// Parse a boolean option value as it appears in recipes and CLI input
///
/// # Errors
///
/// Returns `RecipeError::InvalidOptionValue` for anything outside
/// `true`/`false`.
pub fn parse_option_bool(key: &str, value: &str) -> Result<bool, RecipeError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RecipeError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_static_pic() {
        let variant = VariantKey {
            os: Os::Linux,
            compiler: Compiler::Gcc,
            build_type: BuildType::Release,
            arch: Arch::X86_64,
            shared: false,
            fpic: true,
        };
        assert_eq!(variant.canonical_key(), "linux-gcc-release-x86_64-static-pic");
    }

    #[test]
    fn test_canonical_key_ignores_fpic_for_shared() {
        let mut variant = VariantKey {
            os: Os::Macos,
            compiler: Compiler::AppleClang,
            build_type: BuildType::Debug,
            arch: Arch::Arm64,
            shared: true,
            fpic: true,
        };
        let with_fpic = variant.canonical_key();
        variant.fpic = false;
        // fPIC does not affect the shape of a shared build key suffix
        assert!(with_fpic.ends_with("-shared"));
        assert!(variant.canonical_key().ends_with("-shared"));
    }

    #[test]
    fn test_identical_variants_identical_keys() {
        let a = VariantKey::host(BuildType::Release, false, true);
        let b = VariantKey::host(BuildType::Release, false, true);
        assert_eq!(a, b);
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_setting_parse_rejects_unknown() {
        assert!("plan9".parse::<Os>().is_err());
        assert!("tcc".parse::<Compiler>().is_err());
        assert!("mips".parse::<Arch>().is_err());
        assert!("fastest".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_setting_parse_aliases() {
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert_eq!("aarch64".parse::<Arch>().unwrap(), Arch::Arm64);
    }

    #[test]
    fn test_parse_option_bool() {
        assert!(parse_option_bool("shared", "true").unwrap());
        assert!(!parse_option_bool("fPIC", "false").unwrap());
        assert!(parse_option_bool("shared", "yes").is_err());
    }
}
