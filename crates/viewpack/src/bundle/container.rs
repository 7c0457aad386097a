//! The bundle container format.
//!
//! All integers are little-endian. Strings and byte arrays are prefixed with
//! their length as a `u32`.
//!
//! ```text
//! magic          b"VPK\x01"
//! assembly name  string
//! attributes     u32 count, then strings
//! optimization   u8 (0 = debug, 1 = release)
//! symbols        u32 count, then strings
//! signing        u8 tag
//!                  0: unsigned
//!                  1: public key    u8 public-sign flag, bytes
//!                  2: key file      string path, u8 delay-sign flag
//! units          u32 count, then (string origin, string text) pairs;
//!                an empty origin marks a synthetic unit
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::compilation::{Compilation, OptimizationLevel};

/// Leading bytes of every bundle.
pub const MAGIC: &[u8; 4] = b"VPK\x01";

/// Signing information recorded in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningSection {
    Unsigned,
    PublicKey { public_key: Vec<u8>, public_sign: bool },
    KeyFile { path: PathBuf, delay_sign: bool },
}

/// A source unit stored in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledUnit {
    pub origin: Option<PathBuf>,
    pub text: String,
}

/// Decoded contents of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleImage {
    pub assembly_name: String,
    pub attributes: Vec<String>,
    pub optimization: OptimizationLevel,
    pub symbols: Vec<String>,
    pub signing: SigningSection,
    pub units: Vec<BundledUnit>,
}

/// Errors raised when reading a bundle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("bundle is truncated at byte {0}")]
    Truncated(usize),

    #[error("not a viewpack bundle")]
    BadMagic,

    #[error("string at byte {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("unknown {section} tag {tag}")]
    UnknownTag { section: &'static str, tag: u8 },

    #[error("{0} unexpected bytes after the last unit")]
    TrailingBytes(usize),
}

impl BundleImage {
    /// Capture a compilation together with its assembly attributes.
    pub fn from_compilation(compilation: &Compilation, attributes: Vec<String>) -> Self {
        let options = compilation.options();
        let signing = match (options.crypto_public_key(), options.crypto_key_file()) {
            (Some(public_key), _) => SigningSection::PublicKey {
                public_key: public_key.to_vec(),
                public_sign: options.public_sign(),
            },
            (None, Some(path)) => SigningSection::KeyFile {
                path: path.to_path_buf(),
                delay_sign: options.delay_sign().unwrap_or(false),
            },
            (None, None) => SigningSection::Unsigned,
        };

        Self {
            assembly_name: compilation.assembly_name().to_string(),
            attributes,
            optimization: options.optimization(),
            symbols: options.symbols().to_vec(),
            signing,
            units: compilation
                .units()
                .iter()
                .map(|unit| BundledUnit {
                    origin: unit.origin().map(Path::to_path_buf),
                    text: unit.text().to_string(),
                })
                .collect(),
        }
    }

    /// Serialize the bundle.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        put_str(&mut out, &self.assembly_name);
        put_strs(&mut out, &self.attributes);
        out.push(match self.optimization {
            OptimizationLevel::Debug => 0,
            OptimizationLevel::Release => 1,
        });
        put_strs(&mut out, &self.symbols);

        match &self.signing {
            SigningSection::Unsigned => out.push(0),
            SigningSection::PublicKey {
                public_key,
                public_sign,
            } => {
                out.push(1);
                out.push(u8::from(*public_sign));
                put_bytes(&mut out, public_key);
            }
            SigningSection::KeyFile { path, delay_sign } => {
                out.push(2);
                put_str(&mut out, &path.to_string_lossy());
                out.push(u8::from(*delay_sign));
            }
        }

        put_len(&mut out, self.units.len());
        for unit in &self.units {
            let origin = unit
                .origin
                .as_deref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            put_str(&mut out, &origin);
            put_str(&mut out, &unit.text);
        }
        out
    }

    /// Read a bundle produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError`] when `bytes` is not a well-formed bundle.
    pub fn decode(bytes: &[u8]) -> Result<Self, ContainerError> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(ContainerError::BadMagic);
        }
        let assembly_name = reader.string()?;
        let attributes = reader.strings()?;
        let optimization = match reader.u8()? {
            0 => OptimizationLevel::Debug,
            1 => OptimizationLevel::Release,
            tag => {
                return Err(ContainerError::UnknownTag {
                    section: "optimization",
                    tag,
                });
            }
        };
        let symbols = reader.strings()?;
        let signing = match reader.u8()? {
            0 => SigningSection::Unsigned,
            1 => {
                let public_sign = reader.u8()? != 0;
                let public_key = reader.bytes()?.to_vec();
                SigningSection::PublicKey {
                    public_key,
                    public_sign,
                }
            }
            2 => {
                let path = PathBuf::from(reader.string()?);
                let delay_sign = reader.u8()? != 0;
                SigningSection::KeyFile { path, delay_sign }
            }
            tag => {
                return Err(ContainerError::UnknownTag {
                    section: "signing",
                    tag,
                });
            }
        };

        let count = reader.u32()? as usize;
        let mut units = Vec::new();
        for _ in 0..count {
            let origin = reader.string()?;
            let text = reader.string()?;
            units.push(BundledUnit {
                origin: (!origin.is_empty()).then(|| PathBuf::from(origin)),
                text,
            });
        }

        let trailing = bytes.len() - reader.pos;
        if trailing > 0 {
            return Err(ContainerError::TrailingBytes(trailing));
        }

        Ok(Self {
            assembly_name,
            attributes,
            optimization,
            symbols,
            signing,
            units,
        })
    }
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    // Units and keys never approach 4 GiB.
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_len(out, bytes.len());
    out.extend_from_slice(bytes);
}

fn put_str(out: &mut Vec<u8>, value: &str) {
    put_bytes(out, value.as_bytes());
}

fn put_strs(out: &mut Vec<u8>, values: &[String]) {
    put_len(out, values.len());
    for value in values {
        put_str(out, value);
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ContainerError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ContainerError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ContainerError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, ContainerError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn bytes(&mut self) -> Result<&'a [u8], ContainerError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    fn string(&mut self) -> Result<String, ContainerError> {
        let start = self.pos;
        let raw = self.bytes()?;
        String::from_utf8(raw.to_vec()).map_err(|_| ContainerError::InvalidUtf8(start))
    }

    fn strings(&mut self) -> Result<Vec<String>, ContainerError> {
        let count = self.u32()? as usize;
        (0..count).map(|_| self.string()).collect()
    }
}
