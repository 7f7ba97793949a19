// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for Adr8

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Adr8.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte latched during instruction fetch matched no opcode
    #[error("unknown instruction [{opcode:02X}] at {pc:04X}")]
    UnknownOpcode {
        /// The offending byte
        opcode: u8,
        /// Program counter at the time of the fault
        pc: u16,
    },
    /// `DIV` executed while register b held zero
    #[error("division by zero at {pc:04X}")]
    DivisionByZero {
        /// Program counter at the time of the fault
        pc: u16,
    },
    /// A string literal used an escape outside `\\ \n \0 \r \t`
    #[error("{file}:{line}: unsupported escape code '\\{escape}'")]
    UnknownEscape {
        /// Source file
        file: String,
        /// Source line
        line: usize,
        /// The character following the backslash
        escape: char,
    },
    /// A string literal ran to end of input without a closing quote
    #[error("{file}:{line}: unterminated string literal")]
    UnterminatedString {
        /// Source file
        file: String,
        /// Source line
        line: usize,
    },
    /// A hex literal was neither exactly two nor exactly four digits
    #[error("{file}:{line}: unclear hex number '{literal}', must be explicitly 8-bit (e.g. 0xFF) or explicitly 16-bit (e.g. 0xFFFF)")]
    AmbiguousHexWidth {
        /// Source file
        file: String,
        /// Source line
        line: usize,
        /// The offending literal
        literal: String,
    },
    /// A label reference matched no definition after all inputs were read
    #[error("{file}:{line}: unable to resolve symbol '{name}'")]
    UnresolvedLabel {
        /// Source file of the use
        file: String,
        /// Source line of the use
        line: usize,
        /// The unresolved name
        name: String,
    },
    /// A label was used as the operand of a relative jump
    ///
    /// Labels always patch a two-byte absolute address; relative jumps
    /// take a single signed byte.
    #[error("{file}:{line}: label '{name}' cannot be the operand of a relative jump (labels patch two bytes, relative jumps take one)")]
    RelativeLabelOperand {
        /// Source file
        file: String,
        /// Source line
        line: usize,
        /// The offending label name
        name: String,
    },
    /// The tokenizer produced a character it could not classify
    #[error("{file}:{line}: invalid token: '{lexeme}'")]
    InvalidToken {
        /// Source file
        file: String,
        /// Source line
        line: usize,
        /// The offending text
        lexeme: String,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
