//! Per-call decoder configuration

use std::string::FromUtf8Error;

use encoding_rs::SHIFT_JIS;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk::locate::LocateStrategy;

/// Character set used to turn text meta event payloads into strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Charset {
    /// One byte per character, every byte maps to the code point of the same value
    #[default]
    Latin1,
    /// Strict UTF-8, invalid sequences are an error
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    Utf8Lossy,
    /// Shift_JIS as written by Japanese sequencers (cp932), the usual encoding of XF lyrics.
    /// Invalid sequences are an error
    ShiftJis,
}

/// Text that is not valid in the requested charset
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TextError {
    /// Invalid UTF-8
    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),
    /// Invalid bytes for a legacy encoding
    #[error("text is not valid {0}")]
    Malformed(&'static str),
}

impl Charset {
    /// Decodes `bytes` into a string
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, TextError> {
        match self {
            Charset::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            Charset::Utf8 => Ok(String::from_utf8(bytes)?),
            Charset::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Charset::ShiftJis => {
                let (text, malformed) = SHIFT_JIS.decode_without_bom_handling(&bytes);
                if malformed {
                    Err(TextError::Malformed(SHIFT_JIS.name()))
                } else {
                    Ok(text.into_owned())
                }
            }
        }
    }
}

/// Options that travel with every decode call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeOptions {
    /// Charset for text meta events
    pub charset: Charset,
    /// Clamp out of range data bytes to 127 instead of failing
    pub clip: bool,
    /// Emit a `debug!` record for every chunk and event decoded
    pub debug: bool,
    /// How the loader finds the XF chunks
    pub locate: LocateStrategy,
}

impl DecodeOptions {
    /// Default options: Latin-1 text, no clipping, no tracing, chunk boundary lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the charset
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the clip policy
    pub fn with_clip(mut self, clip: bool) -> Self {
        self.clip = clip;
        self
    }

    /// Enables or disables per event tracing
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the chunk lookup strategy
    pub fn with_locate(mut self, locate: LocateStrategy) -> Self {
        self.locate = locate;
        self
    }
}
