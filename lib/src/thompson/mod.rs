/*!
Bytecode compiler and threaded VM.

This module follows the [Pike VM approach][1]: the compiler lowers the
AST into a linear instruction sequence with relative structure expressed
through split and jump offsets, and the VM simulates a priority-ordered
set of threads over the subject, advancing all of them one codepoint at
a time. Thread deduplication keeps the simulation linear in the subject
length regardless of how non-deterministic the pattern is.

[1]: https://swtch.com/~rsc/regexp/regexp2.html
*/

mod compiler;
mod instr;
mod pikevm;

#[cfg(test)]
mod tests;

use std::fmt::{Display, Formatter};

use crate::ast::{Matcher, ParsedRegex};
use self::instr::{Instr, InstrParser};

pub(crate) use self::pikevm::PikeVm;

/// A compiled regular expression.
///
/// Immutable once built; any number of VM executions can share it.
#[derive(Debug)]
pub(crate) struct CompiledRegex {
    /// VM code. Starts with the search prelude.
    code: Vec<u8>,
    /// Matcher predicates referenced by `Matcher` instructions.
    matchers: Vec<Matcher>,
    /// Length of the capture vector: two save slots per group.
    save_count: usize,
    /// Location right after the search prelude. Anchored execution
    /// starts here, skipping the prelude.
    anchored_entry: usize,
}

impl CompiledRegex {
    pub fn compile(parsed: ParsedRegex) -> Self {
        compiler::Compiler::compile(parsed)
    }

    #[inline]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    #[inline]
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    #[inline]
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    #[inline]
    pub fn anchored_entry(&self) -> usize {
        self.anchored_entry
    }
}

impl Display for CompiledRegex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        for (instr, addr) in InstrParser::new(&self.code) {
            match instr {
                Instr::Match => writeln!(f, "{:05x}: MATCH", addr)?,
                Instr::Literal(cp) => {
                    writeln!(f, "{:05x}: LIT {:?}", addr, cp)?
                }
                Instr::AnyChar => writeln!(f, "{:05x}: ANY_CHAR", addr)?,
                Instr::Matcher(id) => {
                    writeln!(f, "{:05x}: MATCHER {}", addr, id)?
                }
                Instr::Jump(target) => {
                    writeln!(f, "{:05x}: JUMP {:05x}", addr, target)?
                }
                Instr::SplitA(target) => {
                    writeln!(f, "{:05x}: SPLIT_A {:05x}", addr, target)?
                }
                Instr::SplitB(target) => {
                    writeln!(f, "{:05x}: SPLIT_B {:05x}", addr, target)?
                }
                Instr::Save(slot) => {
                    writeln!(f, "{:05x}: SAVE {}", addr, slot)?
                }
                Instr::LineStart => writeln!(f, "{:05x}: LINE_START", addr)?,
                Instr::LineEnd => writeln!(f, "{:05x}: LINE_END", addr)?,
                Instr::WordBoundary => {
                    writeln!(f, "{:05x}: WORD_BOUNDARY", addr)?
                }
                Instr::NotWordBoundary => {
                    writeln!(f, "{:05x}: NOT_WORD_BOUNDARY", addr)?
                }
                Instr::SubjectBegin => {
                    writeln!(f, "{:05x}: SUBJECT_BEGIN", addr)?
                }
                Instr::SubjectEnd => {
                    writeln!(f, "{:05x}: SUBJECT_END", addr)?
                }
            }
        }
        Ok(())
    }
}
