// Script Decoder Error Handling

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, ScdError>;

#[derive(Debug)]
pub enum ScdError {
    // Short read or seek past the end of a bounded view
    Io(io::Error),

    // Opcode byte with no entry in the size table; offset is known only
    // when the opcode was read out of a stream
    UnknownOpcode { opcode: u8, offset: Option<usize> },

    // Record length does not match the opcode's fixed size
    TruncatedRecord {
        opcode: u8,
        expected: usize,
        actual: usize,
    },

    // Structurally invalid container or stream
    Format(String),

    // Bad dump configuration file
    Config(String),

    // Unit name not present in a disassembly
    UnknownUnit(String),
}

impl fmt::Display for ScdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScdError::Io(e) => write!(f, "IO error: {}", e),
            ScdError::UnknownOpcode { opcode, offset } => match offset {
                Some(offset) => write!(
                    f,
                    "Unknown opcode {:#04x} ({}) at stream offset {:#06x}",
                    opcode, opcode, offset
                ),
                None => write!(f, "Unknown opcode {:#04x} ({})", opcode, opcode),
            },
            ScdError::TruncatedRecord {
                opcode,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Truncated record for opcode {:#04x}: expected {} bytes, found {}",
                    opcode, expected, actual
                )
            }
            ScdError::Format(msg) => write!(f, "Format error: {}", msg),
            ScdError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScdError::UnknownUnit(name) => write!(f, "No unit named {}", name),
        }
    }
}

impl std::error::Error for ScdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScdError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ScdError {
    fn from(e: io::Error) -> Self {
        ScdError::Io(e)
    }
}

impl From<toml::de::Error> for ScdError {
    fn from(e: toml::de::Error) -> Self {
        ScdError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for ScdError {
    fn from(e: toml::ser::Error) -> Self {
        ScdError::Config(e.to_string())
    }
}
