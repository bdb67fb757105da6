/*!
Instructions executed by the threaded VM.

Every instruction starts with a one-byte opcode, optionally followed by
operands: a single byte (`Matcher`, `Save`), a UTF-8 encoded codepoint
(`Literal`), or a fixed-width offset into the code (`Jump`, `SplitA`,
`SplitB`). Offsets are absolute little-endian `u32`; all emit and patch
sites agree on the width through the [`Offset`] alias.
*/

use std::mem::size_of;

use crate::utf8;

/// Offset operand of jump and split instructions: an absolute index into
/// the code.
pub(crate) type Offset = u32;

/// Size in bytes of an encoded [`Offset`].
pub(crate) const OFFSET_SIZE: usize = size_of::<Offset>();

/// Instructions supported by the VM.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Instr {
    /// The expression matched at the current position.
    Match,
    /// Matches one specific codepoint.
    Literal(char),
    /// Matches any codepoint, newline included.
    AnyChar,
    /// Matches any codepoint accepted by the matcher with this index.
    Matcher(u8),
    /// Continues execution at the target offset.
    Jump(Offset),
    /// Forks the thread. The current thread continues at the next
    /// instruction and keeps its priority; a new thread starts at the
    /// target offset, right below the current one in priority.
    SplitA(Offset),
    /// Forks the thread. The current thread continues at the target
    /// offset; the new, lower-priority thread starts at the next
    /// instruction.
    SplitB(Offset),
    /// Records the current input position in the given save slot.
    Save(u8),
    /// Matches at the start of the subject or right after a newline.
    LineStart,
    /// Matches at the end of the subject or right before a newline.
    LineEnd,
    /// Matches between a word codepoint and a non-word codepoint.
    WordBoundary,
    /// The negation of [`Instr::WordBoundary`].
    NotWordBoundary,
    /// Matches at the start of the subject only.
    SubjectBegin,
    /// Matches at the end of the subject only.
    SubjectEnd,
}

impl Instr {
    pub const MATCH: u8 = 0x00;
    pub const LITERAL: u8 = 0x01;
    pub const ANY_CHAR: u8 = 0x02;
    pub const MATCHER: u8 = 0x03;
    pub const JUMP: u8 = 0x04;
    pub const SPLIT_A: u8 = 0x05;
    pub const SPLIT_B: u8 = 0x06;
    pub const SAVE: u8 = 0x07;
    pub const LINE_START: u8 = 0x08;
    pub const LINE_END: u8 = 0x09;
    pub const WORD_BOUNDARY: u8 = 0x0a;
    pub const NOT_WORD_BOUNDARY: u8 = 0x0b;
    pub const SUBJECT_BEGIN: u8 = 0x0c;
    pub const SUBJECT_END: u8 = 0x0d;
}

/// Decodes VM code into individual instructions and their addresses.
pub(crate) struct InstrParser<'a> {
    code: &'a [u8],
    addr: usize,
}

impl<'a> InstrParser<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, addr: 0 }
    }

    /// Decodes the instruction at the start of `code`, returning it
    /// together with its size in bytes.
    pub fn decode_instr(code: &[u8]) -> (Instr, usize) {
        match code[0] {
            Instr::MATCH => (Instr::Match, 1),
            Instr::LITERAL => {
                let (cp, width) = utf8::decode(&code[1..])
                    .expect("literal operand is valid UTF-8");
                (Instr::Literal(cp), 1 + width)
            }
            Instr::ANY_CHAR => (Instr::AnyChar, 1),
            Instr::MATCHER => (Instr::Matcher(code[1]), 2),
            Instr::JUMP => {
                (Instr::Jump(Self::decode_offset(&code[1..])), 1 + OFFSET_SIZE)
            }
            Instr::SPLIT_A => (
                Instr::SplitA(Self::decode_offset(&code[1..])),
                1 + OFFSET_SIZE,
            ),
            Instr::SPLIT_B => (
                Instr::SplitB(Self::decode_offset(&code[1..])),
                1 + OFFSET_SIZE,
            ),
            Instr::SAVE => (Instr::Save(code[1]), 2),
            Instr::LINE_START => (Instr::LineStart, 1),
            Instr::LINE_END => (Instr::LineEnd, 1),
            Instr::WORD_BOUNDARY => (Instr::WordBoundary, 1),
            Instr::NOT_WORD_BOUNDARY => (Instr::NotWordBoundary, 1),
            Instr::SUBJECT_BEGIN => (Instr::SubjectBegin, 1),
            Instr::SUBJECT_END => (Instr::SubjectEnd, 1),
            opcode => unreachable!("invalid opcode: {:#04x}", opcode),
        }
    }

    fn decode_offset(code: &[u8]) -> Offset {
        Offset::from_le_bytes(code[..OFFSET_SIZE].try_into().unwrap())
    }
}

impl<'a> Iterator for InstrParser<'a> {
    type Item = (Instr, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.code.is_empty() {
            return None;
        }
        let (instr, size) = InstrParser::decode_instr(self.code);
        let addr = self.addr;
        self.addr += size;
        self.code = &self.code[size..];
        Some((instr, addr))
    }
}
