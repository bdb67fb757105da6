/*!
Compiles the AST into code for the threaded VM.

The compiler walks the node tree emitting instructions into an
[`InstrSeq`]. Instructions that point forward are emitted with a
placeholder offset whose byte index is remembered and patched once the
target is known.
*/

use super::instr::{Instr, Offset, OFFSET_SIZE};
use super::CompiledRegex;
use crate::ast::{AstKind, AstNode, ParsedRegex};

/// A growable buffer of VM instructions.
pub(crate) struct InstrSeq {
    seq: Vec<u8>,
}

impl InstrSeq {
    pub fn new() -> Self {
        Self { seq: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.seq
    }

    /// Location where the next instruction will be emitted.
    #[inline]
    pub fn location(&self) -> usize {
        self.seq.len()
    }

    /// Emits a one-byte instruction, returning its location.
    pub fn emit_instr(&mut self, opcode: u8) -> usize {
        let location = self.location();
        self.seq.push(opcode);
        location
    }

    /// Emits an instruction followed by a placeholder offset, returning
    /// the location of the placeholder so it can be patched later.
    pub fn emit_instr_with_offset(&mut self, opcode: u8) -> usize {
        self.seq.push(opcode);
        let placeholder = self.location();
        self.seq.extend_from_slice(&[0x00; OFFSET_SIZE]);
        placeholder
    }

    /// Emits an instruction with a one-byte operand.
    pub fn emit_instr_with_byte(&mut self, opcode: u8, operand: u8) {
        self.seq.push(opcode);
        self.seq.push(operand);
    }

    /// Emits a `Literal` instruction for the given codepoint.
    pub fn emit_literal(&mut self, cp: char) {
        self.seq.push(Instr::LITERAL);
        let mut buf = [0_u8; 4];
        self.seq.extend_from_slice(cp.encode_utf8(&mut buf).as_bytes());
    }

    /// Overwrites the placeholder at `placeholder` with `target`.
    pub fn patch_offset(&mut self, placeholder: usize, target: usize) {
        let target = Offset::try_from(target).unwrap();
        self.seq[placeholder..placeholder + OFFSET_SIZE]
            .copy_from_slice(&target.to_le_bytes());
    }
}

/// Compiles a [`ParsedRegex`] into a [`CompiledRegex`].
pub(crate) struct Compiler {
    code: InstrSeq,
}

impl Compiler {
    pub fn compile(parsed: ParsedRegex) -> CompiledRegex {
        let mut compiler = Compiler { code: InstrSeq::new() };

        compiler.emit_search_prefix();
        let anchored_entry = compiler.code.location();
        compiler.compile_node(&parsed.ast);
        compiler.code.emit_instr(Instr::MATCH);

        CompiledRegex {
            code: compiler.code.into_inner(),
            matchers: parsed.matchers,
            save_count: 2 * parsed.capture_count as usize,
            anchored_entry,
        }
    }

    /// Emits the search prelude, equivalent to a lazy `.*`, that lets a
    /// match begin at any position. Anchored execution enters the code
    /// right after it.
    fn emit_search_prefix(&mut self) {
        let enter_body = self.code.emit_instr_with_offset(Instr::SPLIT_B);
        let any_char = self.code.emit_instr(Instr::ANY_CHAR);
        let loop_back = self.code.emit_instr_with_offset(Instr::SPLIT_A);
        self.code.patch_offset(loop_back, any_char);
        self.code.patch_offset(enter_body, self.code.location());
    }

    /// Emits the code for a node, wrapped according to its quantifier,
    /// and returns the location where that code starts.
    fn compile_node(&mut self, node: &AstNode) -> usize {
        let start = self.code.location();
        let quantifier = &node.quantifier;
        let mut goto_end = Vec::new();

        if quantifier.allows_none() {
            goto_end.push(self.code.emit_instr_with_offset(Instr::SPLIT_A));
        }

        let mut inner_start = self.compile_node_inner(node);
        // Re-emit the node for each additional mandatory repetition.
        for _ in 1..quantifier.min_repeat() {
            inner_start = self.compile_node_inner(node);
        }

        if quantifier.allows_infinite_repeat() {
            // Loop back over the last copy, preferring to match more.
            let loop_back = self.code.emit_instr_with_offset(Instr::SPLIT_B);
            self.code.patch_offset(loop_back, inner_start);
        } else {
            // Each remaining repetition up to the maximum is optional.
            for _ in quantifier.min_repeat().max(1)..quantifier.max_repeat() {
                goto_end
                    .push(self.code.emit_instr_with_offset(Instr::SPLIT_A));
                self.compile_node_inner(node);
            }
        }

        let end = self.code.location();
        for placeholder in goto_end {
            self.code.patch_offset(placeholder, end);
        }

        start
    }

    fn compile_node_inner(&mut self, node: &AstNode) -> usize {
        let start = self.code.location();

        let capture = node.capture();
        if let Some(capture) = capture {
            self.code.emit_instr_with_byte(Instr::SAVE, (2 * capture) as u8);
        }

        let mut goto_inner_end = Vec::new();
        match &node.kind {
            AstKind::Literal(cp) => {
                self.code.emit_literal(*cp);
            }
            AstKind::AnyChar => {
                self.code.emit_instr(Instr::ANY_CHAR);
            }
            AstKind::Matcher(id) => {
                self.code.emit_instr_with_byte(Instr::MATCHER, *id as u8);
            }
            AstKind::Sequence { children, .. } => {
                for child in children {
                    self.compile_node(child);
                }
            }
            AstKind::Alternation { children, .. } => {
                // The parser produces binary alternations; longer chains
                // nest to the right.
                debug_assert_eq!(children.len(), 2);
                let split = self.code.emit_instr_with_offset(Instr::SPLIT_A);
                self.compile_node(&children[0]);
                goto_inner_end
                    .push(self.code.emit_instr_with_offset(Instr::JUMP));
                let rhs = self.compile_node(&children[1]);
                self.code.patch_offset(split, rhs);
            }
            AstKind::LineStart => {
                self.code.emit_instr(Instr::LINE_START);
            }
            AstKind::LineEnd => {
                self.code.emit_instr(Instr::LINE_END);
            }
            AstKind::WordBoundary => {
                self.code.emit_instr(Instr::WORD_BOUNDARY);
            }
            AstKind::NotWordBoundary => {
                self.code.emit_instr(Instr::NOT_WORD_BOUNDARY);
            }
            AstKind::SubjectBegin => {
                self.code.emit_instr(Instr::SUBJECT_BEGIN);
            }
            AstKind::SubjectEnd => {
                self.code.emit_instr(Instr::SUBJECT_END);
            }
        }

        // The left branch of an alternation jumps here, right before the
        // closing save, so that it records the group end too.
        let inner_end = self.code.location();
        for placeholder in goto_inner_end {
            self.code.patch_offset(placeholder, inner_end);
        }

        if let Some(capture) = capture {
            self.code
                .emit_instr_with_byte(Instr::SAVE, (2 * capture + 1) as u8);
        }

        start
    }
}
