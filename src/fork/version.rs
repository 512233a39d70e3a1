//! `'vers'` resources: packed NumVersion, region code, short and long version strings.

use super::resource::ResourceFork;
use crate::catalog::bytes::{BeReader, PutBe};
use crate::encoding::{NameCodec, TextEncoding};
use crate::error::{EncodeError, ResourceForkError};
use crate::types::FourCharCode;
use std::fmt;
use tracing::debug;

pub const VERSION_RESOURCE_TYPE: FourCharCode = FourCharCode::from_bytes(*b"vers");

/// ID of the version resource describing the file itself. ID 2 describes the package it
/// ships in.
pub const VERSION_RESOURCE_ID: i16 = 1;

/// Release stage byte of a NumVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    Development,
    Alpha,
    Beta,
    Final,
    Unknown(u8),
}

impl ReleaseStage {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x20 => ReleaseStage::Development,
            0x40 => ReleaseStage::Alpha,
            0x60 => ReleaseStage::Beta,
            0x80 => ReleaseStage::Final,
            other => ReleaseStage::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            ReleaseStage::Development => 0x20,
            ReleaseStage::Alpha => 0x40,
            ReleaseStage::Beta => 0x60,
            ReleaseStage::Final => 0x80,
            ReleaseStage::Unknown(other) => other,
        }
    }
}

/// Packed version number: BCD major, minor and bug-fix nibbles, stage, BCD non-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumVersion {
    pub major_bcd: u8,
    pub minor_and_bug_fix: u8,
    pub stage: ReleaseStage,
    pub non_release_bcd: u8,
}

impl NumVersion {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            major_bcd: bytes[0],
            minor_and_bug_fix: bytes[1],
            stage: ReleaseStage::from_raw(bytes[2]),
            non_release_bcd: bytes[3],
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [
            self.major_bcd,
            self.minor_and_bug_fix,
            self.stage.raw(),
            self.non_release_bcd,
        ]
    }

    pub fn major(self) -> u32 {
        from_bcd(self.major_bcd)
    }

    pub fn minor(self) -> u32 {
        (self.minor_and_bug_fix >> 4) as u32
    }

    pub fn bug_fix(self) -> u32 {
        (self.minor_and_bug_fix & 0x0f) as u32
    }

    pub fn non_release(self) -> u32 {
        from_bcd(self.non_release_bcd)
    }
}

fn from_bcd(byte: u8) -> u32 {
    (byte >> 4) as u32 * 10 + (byte & 0x0f) as u32
}

impl fmt::Display for NumVersion {
    /// `1.0`, `7.5.3`, `2.1b4`, `1.0d12`, `3.0f2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())?;
        if self.bug_fix() != 0 {
            write!(f, ".{}", self.bug_fix())?;
        }
        let suffix = match self.stage {
            ReleaseStage::Development => Some('d'),
            ReleaseStage::Alpha => Some('a'),
            ReleaseStage::Beta => Some('b'),
            ReleaseStage::Final if self.non_release() > 0 => Some('f'),
            ReleaseStage::Final | ReleaseStage::Unknown(_) => None,
        };
        if let Some(suffix) = suffix {
            write!(f, "{}{}", suffix, self.non_release())?;
        }
        Ok(())
    }
}

/// Decoded contents of a version resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResource {
    pub number: NumVersion,
    pub region_code: i16,
    pub short_version: String,
    pub long_version: String,
}

impl VersionResource {
    /// Decode resource data. A missing long string decodes as empty.
    pub fn parse(bytes: &[u8]) -> Result<Self, ResourceForkError> {
        let mut source = BeReader::new(bytes);
        let number = source
            .array::<4>()
            .map_err(|_| ResourceForkError::TruncatedVersion(bytes.len()))?;
        let region_code = source
            .i16()
            .map_err(|_| ResourceForkError::TruncatedVersion(bytes.len()))?;
        let short_len = source
            .u8()
            .map_err(|_| ResourceForkError::TruncatedVersion(bytes.len()))?;
        let short = source
            .take(short_len as usize)
            .map_err(|_| ResourceForkError::TruncatedVersion(bytes.len()))?;
        let long: &[u8] = match source.u8() {
            Ok(len) => {
                let rest = &bytes[6 + 1 + short.len() + 1..];
                &rest[..(len as usize).min(rest.len())]
            }
            Err(_) => &[],
        };

        // Version strings are stored in the system script; only Roman is mapped.
        Ok(Self {
            number: NumVersion::from_bytes(number),
            region_code,
            short_version: NameCodec::decode(short, TextEncoding::MacRoman),
            long_version: NameCodec::decode(long, TextEncoding::MacRoman),
        })
    }

    /// Serialize to resource data, with strings encoded as Mac Roman.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.number.to_bytes());
        out.put_i16(self.region_code);
        for text in [&self.short_version, &self.long_version] {
            out.extend_from_slice(&NameCodec::encode_pascal(text, TextEncoding::MacRoman)?);
        }
        Ok(out)
    }
}

/// Locates and decodes `'vers'` ID 1 in a resource fork.
///
/// Every query collapses "no resource fork", "no version resource" and "malformed fork" into
/// `None`; the last case is logged at debug level.
pub struct VersionResourceParser;

impl VersionResourceParser {
    pub fn parse(fork: &[u8]) -> Result<Option<VersionResource>, ResourceForkError> {
        if fork.is_empty() {
            return Ok(None);
        }
        let map = ResourceFork::parse(fork)?;
        match map.find(VERSION_RESOURCE_TYPE, VERSION_RESOURCE_ID)? {
            Some(data) => VersionResource::parse(data).map(Some),
            None => Ok(None),
        }
    }

    pub fn version_resource(fork: &[u8]) -> Option<VersionResource> {
        match Self::parse(fork) {
            Ok(found) => found,
            Err(err) => {
                debug!(error = %err, fork_len = fork.len(), "Ignoring malformed resource fork");
                None
            }
        }
    }

    pub fn short_version_string(fork: &[u8]) -> Option<String> {
        Self::version_resource(fork).map(|vers| vers.short_version)
    }

    pub fn version_string_from_version_number(fork: &[u8]) -> Option<String> {
        Self::version_resource(fork).map(|vers| vers.number.to_string())
    }

    pub fn long_version_string(fork: &[u8]) -> Option<String> {
        Self::version_resource(fork).map(|vers| vers.long_version)
    }
}
