//! Scripts as carried by transaction inputs and outputs
//!
//! A script keeps its exact bytes so that every transaction re-encodes to the
//! bytes it was decoded from, whatever the script contains. Parsing into
//! elements happens on demand.

use std::fmt;

use thiserror::Error;

/// Push the next byte's worth of length-prefixed data
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_0: u8 = 0x00;
pub const OP_1: u8 = 0x51;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// Errors raised while walking a script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Push of {needed} bytes runs past the end of the script ({remaining} left)")]
    EarlyEnd { needed: usize, remaining: usize },
}

/// Errors raised while reading a script number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptNumError {
    #[error("Script number of {len} bytes exceeds the {max} byte limit")]
    Overflow { len: usize, max: usize },
    #[error("Script number is not minimally encoded")]
    NonMinimal,
}

/// One parsed script element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptElement<'a> {
    /// Any opcode that is not a data push
    Opcode(u8),
    /// Pushed data; `OP_0` pushes the empty string
    Data(&'a [u8]),
}

/// Raw script bytes
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(hex).map(Script)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the elements; iteration stops after the first error
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            data: &self.0,
            pos: 0,
            failed: false,
        }
    }

    /// First element, `None` for an empty script
    pub fn first_element(&self) -> Option<Result<ScriptElement<'_>, ScriptError>> {
        self.elements().next()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

/// Iterator returned by [`Script::elements`]
pub struct Elements<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Elements<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ScriptError> {
        let remaining = self.data.len() - self.pos;
        if n > remaining {
            return Err(ScriptError::EarlyEnd {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_len(&mut self, width: usize) -> Result<usize, ScriptError> {
        let bytes = self.take(width)?;
        let mut buf = [0u8; 4];
        buf[..width].copy_from_slice(bytes);
        Ok(u32::from_le_bytes(buf) as usize)
    }

    fn next_element(&mut self, op: u8) -> Result<ScriptElement<'a>, ScriptError> {
        let len = match op {
            OP_0 => return Ok(ScriptElement::Data(&[])),
            0x01..=0x4b => op as usize,
            OP_PUSHDATA1 => self.take_len(1)?,
            OP_PUSHDATA2 => self.take_len(2)?,
            OP_PUSHDATA4 => self.take_len(4)?,
            _ => return Ok(ScriptElement::Opcode(op)),
        };
        self.take(len).map(ScriptElement::Data)
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Result<ScriptElement<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let op = self.data[self.pos];
        self.pos += 1;
        let element = self.next_element(op);
        self.failed = element.is_err();
        Some(element)
    }
}

/// Incremental script construction using minimal pushes
#[derive(Debug, Default)]
pub struct ScriptBuilder(Vec<u8>);

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, op: u8) -> Self {
        self.0.push(op);
        self
    }

    pub fn push_data(mut self, data: &[u8]) -> Self {
        match data.len() {
            0 => self.0.push(OP_0),
            len @ 1..=0x4b => self.0.push(len as u8),
            len @ 0x4c..=0xff => {
                self.0.push(OP_PUSHDATA1);
                self.0.push(len as u8);
            }
            len @ 0x100..=0xffff => {
                self.0.push(OP_PUSHDATA2);
                self.0.extend_from_slice(&(len as u16).to_le_bytes());
            }
            len => {
                self.0.push(OP_PUSHDATA4);
                self.0.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Push a number as data, never as a small-integer opcode. This is how
    /// coinbase scripts commit to the block height.
    pub fn push_script_num(self, n: i64) -> Self {
        self.push_data(&encode_script_num(n))
    }

    pub fn into_script(self) -> Script {
        Script(self.0)
    }
}

/// Decode a little-endian sign-magnitude script number
pub fn read_script_num(
    bytes: &[u8],
    require_minimal: bool,
    max_len: usize,
) -> Result<i64, ScriptNumError> {
    if bytes.len() > max_len || bytes.len() > 8 {
        return Err(ScriptNumError::Overflow {
            len: bytes.len(),
            max: max_len.min(8),
        });
    }

    let Some((&last, rest)) = bytes.split_last() else {
        return Ok(0);
    };

    // A trailing 0x00 or 0x80 is only allowed to carry the sign bit
    if require_minimal && last & 0x7f == 0 && rest.last().map_or(true, |b| b & 0x80 == 0) {
        return Err(ScriptNumError::NonMinimal);
    }

    let mut magnitude: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let byte = if i == bytes.len() - 1 { byte & 0x7f } else { byte };
        magnitude |= (byte as u64) << (8 * i);
    }

    let value = magnitude as i64;
    Ok(if last & 0x80 != 0 { -value } else { value })
}

/// Minimal script number encoding of `n`
pub fn encode_script_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }

    let negative = n < 0;
    let mut magnitude = n.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while magnitude > 0 {
        out.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // Keep the sign bit free; add a byte when the top bit is taken
    let top = out.len() - 1;
    if out[top] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[top] |= 0x80;
    }
    out
}
