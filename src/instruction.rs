use crate::error::Result;
use crate::opcode_tables;
use std::fmt::{Display, Error, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Immutable view over a record's bytes.
///
/// Views made with [`RecordBytes::tail`] share the backing buffer of the
/// record they were cut from.
#[derive(Debug, Clone)]
pub struct RecordBytes {
    data: Arc<[u8]>,
    start: usize,
}

impl RecordBytes {
    pub fn new(data: Vec<u8>) -> Self {
        RecordBytes {
            data: data.into(),
            start: 0,
        }
    }

    /// A view of the same bytes with the first `skip` dropped
    pub fn tail(&self, skip: usize) -> Self {
        RecordBytes {
            data: Arc::clone(&self.data),
            start: (self.start + skip).min(self.data.len()),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// True when both views are backed by the same record buffer
    pub fn shares_storage(&self, other: &RecordBytes) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Deref for RecordBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for RecordBytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for RecordBytes {}

/// One addressed script instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte address in the stream's flat address space
    pub program_counter: usize,
    pub opcode: u8,
    pub bytes: RecordBytes,
}

impl Instruction {
    pub fn new(program_counter: usize, opcode: u8, bytes: RecordBytes) -> Self {
        Instruction {
            program_counter,
            opcode,
            bytes,
        }
    }

    pub fn raw(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn name(&self) -> Result<&'static str> {
        opcode_tables::name_of(self.opcode)
    }

    /// Raw bytes as two-digit lowercase hex separated by single spaces
    pub fn hex(&self) -> String {
        self.raw()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Call-style rendering, `Name(params);`
    pub fn call(&self) -> Result<String> {
        decode(self.opcode, self.raw())
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        let name = opcode_tables::descriptor(self.opcode)
            .map(|d| d.name)
            .unwrap_or("unknown");
        write!(f, "{:04x}: {:<14} {}", self.program_counter, name, self.hex())
    }
}

/// Render one record as `Name(params);`.
///
/// Fails with `TruncatedRecord` when `raw` is not exactly the opcode's size
/// and with `UnknownOpcode` when the opcode is not in the table.
pub fn decode(opcode: u8, raw: &[u8]) -> Result<String> {
    let name = opcode_tables::name_of(opcode)?;
    let signature = opcode_tables::signature_for(opcode, raw)?;
    Ok(format!("{}({});", name, signature))
}
