// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Two-pass assembler: emit bytes with placeholder addresses, then
//! patch every label reference once all definitions are known

#[cfg(test)]
mod tests;

pub mod token;

use crate::{
    cpu::MNEMONICS,
    error::{Error, Result},
};
use std::collections::HashMap;
use token::{TokenKind, Tokenizer};

/// Path of the distinguished bootstrap source.
///
/// When this is the first input of an assembly run, the output image is
/// prefixed with its u16 little-endian byte length, for the loader stub
/// to read off the serial port before copying the payload.
pub const BOOTSTRAP_PATH: &str = "demos/bootstrap.asm";

/// The assembled image of [BOOTSTRAP_PATH]: read a length-prefixed
/// program from the serial port at 0x1000, copy it over low memory,
/// fall through into the payload at 0x18.
///
/// A host driver pokes this at address 0 before the first clock edge;
/// the copy loop overwrites the running stub with the identical bytes
/// at the front of the streamed image, which is what makes every label
/// offset in the payload equal its load address.
pub const BOOT_LOADER: &[u8] = &[
    0x10, 0x00, 0x10, // LDAL 0x1000   program length, low
    0x11, 0x00, 0x10, // LDAH 0x1000   program length, high
    0x0D, 0x00, 0x00, // SETY 0x0000   copy destination
    0x12, 0x00, 0x10, // LDBL 0x1000   copy: next payload byte
    0x26, //            SYBL
    0x35, //            INCY
    0x0B, 0x01, 0x00, // SETB 0x0001
    0x31, //            SUB           one less to go
    0x0B, 0x00, 0x00, // SETB 0x0000
    0x46, 0x09, 0x00, // JGTA copy
];

/// A label definition or use: a name pinned to a byte offset, with the
/// source position for diagnostics
#[derive(Clone, Debug, PartialEq, Eq)]
struct LabelMark {
    name: String,
    offset: u16,
    file: String,
    line: usize,
}

/// The two-pass assembler.
///
/// One [Assembler] owns one assembly run: feed it source files in order
/// with [Assembler::pass], then take the linked image with
/// [Assembler::finish]. The opcode table is owned by the instance, so
/// runs are independent and re-entrant.
///
/// # Examples
/// ```rust
/// # use adr8::*;
/// let mut asm = Assembler::new();
/// asm.pass("SETA 0x0003\nSETB 0x0002\nADD\nHALT\n", "sum.asm").unwrap();
/// let image = asm.finish().unwrap();
/// assert_eq!(&[0x0A, 0x03, 0x00, 0x0B, 0x02, 0x00, 0x30, 0x01], &*image);
/// ```
pub struct Assembler {
    opcodes: HashMap<&'static str, u8>,
    program: Vec<u8>,
    definitions: Vec<LabelMark>,
    uses: Vec<LabelMark>,
    first_file: Option<String>,
    rel_jump_pending: bool,
}

impl Assembler {
    /// Constructs an assembler with a fresh copy of the opcode table
    pub fn new() -> Self {
        Assembler {
            opcodes: MNEMONICS.iter().copied().collect(),
            program: Vec::new(),
            definitions: Vec::new(),
            uses: Vec::new(),
            first_file: None,
            rel_jump_pending: false,
        }
    }

    /// Assembles one source file into the growing image.
    ///
    /// `file` names the input in diagnostics and in the bootstrap-mode
    /// check. Label references may point at definitions in any file of
    /// the run, earlier or later.
    pub fn pass(&mut self, source: &str, file: &str) -> Result<()> {
        self.first_file.get_or_insert_with(|| file.to_owned());
        let mut lexer = Tokenizer::new(source, file);
        while let Some(token) = lexer.next_token()? {
            match token.kind {
                TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment => {}
                TokenKind::Identifier => {
                    let pending = self.rel_jump_pending;
                    self.rel_jump_pending = false;
                    match self.opcodes.get(token.text.as_str()) {
                        Some(&opcode) => {
                            // relative jumps take a one-byte operand, which a
                            // label placeholder cannot fill
                            self.rel_jump_pending = matches!(opcode, 0x40..=0x43);
                            self.program.push(opcode);
                        }
                        // not a mnemonic: a label reference, two
                        // placeholder bytes to patch at link time
                        None => {
                            if pending {
                                return Err(Error::RelativeLabelOperand {
                                    file: file.to_owned(),
                                    line: token.line,
                                    name: token.text,
                                });
                            }
                            self.uses.push(LabelMark {
                                name: token.text,
                                offset: self.program.len() as u16,
                                file: file.to_owned(),
                                line: token.line,
                            });
                            self.program.extend([0x00, 0x00]);
                        }
                    }
                }
                TokenKind::Label => {
                    self.definitions.push(LabelMark {
                        name: token.text,
                        offset: self.program.len() as u16,
                        file: file.to_owned(),
                        line: token.line,
                    });
                }
                TokenKind::DecNumber => {
                    self.rel_jump_pending = false;
                    self.program.push(parse_decimal(&token.text));
                }
                TokenKind::HexNumber => {
                    self.rel_jump_pending = false;
                    let digits = &token.text[2..];
                    match digits.len() {
                        2 => self
                            .program
                            .push(u8::from_str_radix(digits, 16).unwrap_or(0)),
                        4 => self
                            .program
                            .extend(u16::from_str_radix(digits, 16).unwrap_or(0).to_le_bytes()),
                        _ => {
                            return Err(Error::AmbiguousHexWidth {
                                file: file.to_owned(),
                                line: token.line,
                                literal: token.text,
                            })
                        }
                    }
                }
                TokenKind::Str => {
                    self.rel_jump_pending = false;
                    self.program.extend(token.text.bytes());
                    self.program.push(0);
                }
                TokenKind::Unknown => {
                    return Err(Error::InvalidToken {
                        file: file.to_owned(),
                        line: token.line,
                        lexeme: token.text,
                    })
                }
            }
        }
        Ok(())
    }

    /// Patches every label use with the offset of its definition.
    ///
    /// Later definitions shadow earlier ones: a name defined twice
    /// resolves every use to the last definition in file order.
    fn link(&mut self) -> Result<()> {
        for label_use in &self.uses {
            let mut resolved = false;
            for definition in &self.definitions {
                if definition.name == label_use.name {
                    let target = definition.offset.to_le_bytes();
                    let offset = label_use.offset as usize;
                    self.program[offset] = target[0];
                    self.program[offset + 1] = target[1];
                    resolved = true;
                }
            }
            if !resolved {
                return Err(Error::UnresolvedLabel {
                    file: label_use.file.clone(),
                    line: label_use.line,
                    name: label_use.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Links and returns the final image.
    ///
    /// In bootstrap mode (first input was [BOOTSTRAP_PATH]) the image
    /// is prefixed with its u16 little-endian byte length.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.link()?;
        if self.first_file.as_deref() == Some(BOOTSTRAP_PATH) {
            let mut image = Vec::with_capacity(self.program.len() + 2);
            image.extend((self.program.len() as u16).to_le_bytes());
            image.extend(&self.program);
            return Ok(image);
        }
        Ok(self.program)
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Assembler::new()
    }
}

/// atoi-style parse truncated to 8 bits: wraps instead of failing on
/// out-of-range input
fn parse_decimal(text: &str) -> u8 {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut value = 0i32;
    for digit in digits.bytes() {
        value = value.wrapping_mul(10).wrapping_add((digit - b'0') as i32);
    }
    if negative {
        value = value.wrapping_neg();
    }
    value as u8
}
