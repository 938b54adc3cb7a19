//! Script stream decoding.
//!
//! A stream starts with a table of little-endian u16 function offsets. The
//! first entry doubles as the table's size in bytes, so a stream with
//! `first / 2` functions has its first function right after the table.
//! Functions are walked one record at a time and every record gets a
//! program counter in one flat address space shared by all functions.

use crate::error::{Result, ScdError};
use crate::instruction::{Instruction, RecordBytes};
use crate::opcode_tables::{self, EVT_END, SLEEP, SLEEPING};
use crate::section::SectionReader;
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Decoded script: every instruction keyed by program counter, plus the
/// program counter each function starts at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStream {
    instructions: BTreeMap<usize, Instruction>,
    function_starts: Vec<usize>,
}

impl ScriptStream {
    /// Assemble a stream from already decoded parts
    pub fn from_parts(instructions: Vec<Instruction>, function_starts: Vec<usize>) -> Self {
        ScriptStream {
            instructions: instructions
                .into_iter()
                .map(|i| (i.program_counter, i))
                .collect(),
            function_starts,
        }
    }

    pub fn instructions(&self) -> &BTreeMap<usize, Instruction> {
        &self.instructions
    }

    /// Function entry program counters in discovery order
    pub fn function_starts(&self) -> &[usize] {
        &self.function_starts
    }

    pub fn get(&self, program_counter: usize) -> Option<&Instruction> {
        self.instructions.get(&program_counter)
    }

    /// Instructions in increasing program counter order
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.values()
    }

    pub fn program_counters(&self) -> Vec<usize> {
        self.instructions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Decode the script occupying the first `length` bytes of `source`.
///
/// Each function runs from its offset to the next function's offset, or
/// to the end of the stream for the last one, and stops early at
/// `EvtEnd`. When the next offset does not lie after the current one the
/// function is allowed to run to the end of the stream. A record that
/// would cross the end of its function fails with `TruncatedRecord`.
pub fn decode_stream<R: Read + Seek>(source: &mut R, length: u64) -> Result<ScriptStream> {
    let mut section = SectionReader::new(source, 0, length);
    section.seek(SeekFrom::Start(0))?;

    let first = section.read_u16le()?;
    if first == 0 {
        return Err(ScdError::Format(
            "script declares no functions (first offset is 0)".to_string(),
        ));
    }
    if first % 2 != 0 {
        return Err(ScdError::Format(format!(
            "script offset table length {} is not a multiple of 2",
            first
        )));
    }

    let mut offsets = Vec::with_capacity(first as usize / 2);
    offsets.push(first);
    for _ in 1..first / 2 {
        offsets.push(section.read_u16le()?);
    }
    debug!("script of {} bytes, function offsets {:?}", length, offsets);

    let mut stream = ScriptStream::default();
    let mut program_counter = 0usize;

    for (index, &offset) in offsets.iter().enumerate() {
        let start = offset as u64;
        if start >= length {
            return Err(ScdError::Format(format!(
                "function {} starts at {:#06x}, past the end of a {} byte script",
                index, offset, length
            )));
        }
        let budget = match offsets.get(index + 1) {
            Some(&next) if next > offset => (next - offset) as u64,
            _ => length - start,
        };
        debug!(
            "function {} at {:#06x}: {} bytes, pc {}",
            index, offset, budget, program_counter
        );

        stream.function_starts.push(program_counter);
        section.seek(SeekFrom::Start(start))?;

        let mut consumed = 0u64;
        while consumed < budget {
            let at = start + consumed;
            let opcode = section.read_u8()?;
            let desc = match opcode_tables::descriptor(opcode) {
                Some(desc) => desc,
                None => {
                    warn!("unknown opcode {:#04x} at {:#06x}", opcode, at);
                    return Err(ScdError::UnknownOpcode {
                        opcode,
                        offset: Some(at as usize),
                    });
                }
            };

            // a record may not spill into the next function or past the
            // end of the stream
            let available = budget - consumed;
            if desc.size as u64 > available {
                warn!(
                    "{} at {:#06x} needs {} bytes, function has {} left",
                    desc.name, at, desc.size, available
                );
                return Err(ScdError::TruncatedRecord {
                    opcode,
                    expected: desc.size,
                    actual: available as usize,
                });
            }

            let mut record = vec![0u8; desc.size];
            record[0] = opcode;
            section.read_exact(&mut record[1..])?;
            let bytes = RecordBytes::new(record);

            // SLEEP carries a SLEEPING view over its last three bytes, one
            // address later; the program counter still moves by four.
            if opcode == SLEEP {
                let sleeping = Instruction::new(program_counter + 1, SLEEPING, bytes.tail(1));
                stream.instructions.insert(program_counter + 1, sleeping);
            }

            let instruction = Instruction::new(program_counter, opcode, bytes);
            trace!("{}", instruction);
            stream.instructions.insert(program_counter, instruction);

            program_counter += desc.size;
            consumed += desc.size as u64;

            if opcode == EVT_END {
                break;
            }
        }
    }

    debug!(
        "decoded {} instructions in {} functions",
        stream.len(),
        stream.function_starts.len()
    );
    Ok(stream)
}

/// Decode a script held in memory
pub fn decode_bytes(data: &[u8]) -> Result<ScriptStream> {
    let mut cursor = Cursor::new(data);
    decode_stream(&mut cursor, data.len() as u64)
}
