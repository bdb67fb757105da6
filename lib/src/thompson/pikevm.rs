/*!
Threaded simulation of the compiled code.

"Threads" here are VM states — an instruction pointer plus a capture
snapshot — scheduled cooperatively, not OS threads. The thread list is
ordered: position in the list is match priority, index 0 the highest.
All threads advance in lock step, one input codepoint at a time, so the
subject is scanned exactly once.
*/

use std::mem;

use smallvec::{smallvec, SmallVec};

use super::instr::{Instr, InstrParser};
use super::CompiledRegex;
use crate::unicode::is_word_char;
use crate::utf8::{self, InvalidUtf8Policy};

/// Marker for threads retired during the current step round. Compaction
/// removes them before the next round.
const RETIRED: usize = usize::MAX;

type Saves = SmallVec<[Option<usize>; 8]>;

/// One VM thread: the next instruction to execute and the capture
/// positions recorded so far.
struct Thread {
    ip: usize,
    saves: Saves,
}

enum StepResult {
    /// The thread consumed the current codepoint and awaits the next.
    Consumed,
    /// The thread reached `Match`.
    Matched,
    /// The thread cannot continue.
    Failed,
}

/// What the step loop sees of the subject at one input position.
struct StepContext {
    /// Byte offset of the current position.
    pos: usize,
    /// Byte offset of the end of the subject.
    end: usize,
    /// Codepoint at the current position, `None` at the end.
    current: Option<char>,
    /// Codepoint right before the current position.
    previous: Option<char>,
}

impl StepContext {
    fn is_line_start(&self) -> bool {
        self.pos == 0 || self.previous == Some('\n')
    }

    fn is_line_end(&self) -> bool {
        self.pos == self.end || self.current == Some('\n')
    }

    fn is_word_boundary(&self) -> bool {
        self.pos == 0
            || self.pos == self.end
            || self.previous.map(is_word_char) != self.current.map(is_word_char)
    }
}

/// Executes a [`CompiledRegex`] over a subject.
pub(crate) struct PikeVm<'r> {
    program: &'r CompiledRegex,
    /// Live threads, highest priority first.
    threads: Vec<Thread>,
    /// One flag per code byte, set when an instruction at that address
    /// has been executed during the current input position. A thread
    /// reaching a flagged address would retrace work a higher-priority
    /// thread already did at this position, and is retired instead.
    /// Cleared on every input position.
    executed: Vec<bool>,
}

impl<'r> PikeVm<'r> {
    pub fn new(program: &'r CompiledRegex) -> Self {
        Self {
            program,
            threads: Vec::new(),
            executed: vec![false; program.code().len()],
        }
    }

    /// Runs the program over `subject`.
    ///
    /// With `anchored`, execution enters the code after the search
    /// prelude and a thread reaching `Match` before the end of the
    /// subject is discarded, so the match must cover the whole subject.
    /// Without it, the prelude lets the match begin anywhere and the
    /// first match found wins. With `longest`, execution continues past
    /// a match while threads of higher priority remain, keeping the
    /// furthest-reaching match.
    ///
    /// On success, returns the capture vector: byte offsets into
    /// `subject`, two slots per group, group 0 covering the whole match.
    pub fn exec(
        &mut self,
        subject: &[u8],
        anchored: bool,
        longest: bool,
        policy: InvalidUtf8Policy,
    ) -> Option<Vec<Option<usize>>> {
        let mut found: Option<Saves> = None;

        self.threads.clear();
        let entry = if anchored { self.program.anchored_entry() } else { 0 };
        self.threads.push(Thread {
            ip: entry,
            saves: smallvec![None; self.program.save_count()],
        });

        let mut ctx = StepContext {
            pos: 0,
            end: subject.len(),
            current: None,
            previous: None,
        };
        let mut width = 0;

        loop {
            match Self::read(subject, ctx.pos, policy) {
                Some((cp, w)) => {
                    ctx.current = Some(cp);
                    width = w;
                }
                None => {
                    // End of the subject, possibly early under the
                    // `Truncate` policy.
                    ctx.current = None;
                    ctx.end = ctx.pos;
                }
            }

            self.executed.fill(false);

            // Step every thread in priority order. Threads spawned by
            // splits land right after their parent and are stepped
            // within the same round.
            let mut i = 0;
            while i < self.threads.len() {
                match self.step(i, &ctx) {
                    StepResult::Matched => {
                        if anchored && ctx.current.is_some() {
                            // Not at the end of the subject: not a full
                            // match.
                            self.threads[i].ip = RETIRED;
                        } else {
                            found =
                                Some(mem::take(&mut self.threads[i].saves));
                            // Threads of lower priority can no longer
                            // win.
                            self.threads.truncate(i);
                            if !longest {
                                return found.map(SmallVec::into_vec);
                            }
                        }
                    }
                    StepResult::Failed => self.threads[i].ip = RETIRED,
                    StepResult::Consumed => {}
                }
                i += 1;
            }

            self.threads.retain(|thread| thread.ip != RETIRED);

            if ctx.current.is_none() {
                break;
            }
            if self.threads.is_empty() {
                return found.map(SmallVec::into_vec);
            }

            ctx.previous = ctx.current;
            ctx.pos += width;
        }

        found.map(SmallVec::into_vec)
    }

    /// Advances the thread at `index` until it consumes the current
    /// codepoint, matches, or dies. Non-consuming instructions are
    /// executed in place; splits insert the sibling thread right below
    /// the current one.
    fn step(&mut self, index: usize, ctx: &StepContext) -> StepResult {
        loop {
            let ip = self.threads[index].ip;
            if self.executed[ip] {
                return StepResult::Failed;
            }
            self.executed[ip] = true;

            let (instr, size) =
                InstrParser::decode_instr(&self.program.code()[ip..]);
            let next_ip = ip + size;

            match instr {
                Instr::Literal(cp) => {
                    self.threads[index].ip = next_ip;
                    return if ctx.current == Some(cp) {
                        StepResult::Consumed
                    } else {
                        StepResult::Failed
                    };
                }
                Instr::AnyChar => {
                    self.threads[index].ip = next_ip;
                    return StepResult::Consumed;
                }
                Instr::Matcher(id) => {
                    self.threads[index].ip = next_ip;
                    let matcher = &self.program.matchers()[id as usize];
                    return match ctx.current {
                        Some(cp) if matcher.matches(cp) => {
                            StepResult::Consumed
                        }
                        _ => StepResult::Failed,
                    };
                }
                Instr::Jump(target) => {
                    let target = target as usize;
                    // If the target instruction is already going to be
                    // executed by another thread, this one is redundant.
                    if self.threads.iter().any(|t| t.ip == target) {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = target;
                }
                Instr::SplitA(target) => {
                    let saves = self.threads[index].saves.clone();
                    self.add_thread(index + 1, target as usize, saves);
                    self.threads[index].ip = next_ip;
                }
                Instr::SplitB(target) => {
                    let saves = self.threads[index].saves.clone();
                    self.add_thread(index + 1, next_ip, saves);
                    self.threads[index].ip = target as usize;
                }
                Instr::Save(slot) => {
                    self.threads[index].saves[slot as usize] = Some(ctx.pos);
                    self.threads[index].ip = next_ip;
                }
                Instr::LineStart => {
                    if !ctx.is_line_start() {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::LineEnd => {
                    if !ctx.is_line_end() {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::WordBoundary => {
                    if !ctx.is_word_boundary() {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::NotWordBoundary => {
                    if ctx.is_word_boundary() {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::SubjectBegin => {
                    if ctx.pos != 0 {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::SubjectEnd => {
                    if ctx.pos != ctx.end {
                        return StepResult::Failed;
                    }
                    self.threads[index].ip = next_ip;
                }
                Instr::Match => {
                    self.threads[index].ip = next_ip;
                    return StepResult::Matched;
                }
            }
        }
    }

    /// Inserts a new thread at the given priority index, unless its
    /// instruction is already claimed by an existing thread or was
    /// already executed at this position.
    fn add_thread(&mut self, index: usize, ip: usize, saves: Saves) {
        if self.executed[ip] || self.threads.iter().any(|t| t.ip == ip) {
            return;
        }
        self.threads.insert(index, Thread { ip, saves });
    }

    /// Decodes the codepoint at `pos`, applying the invalid-sequence
    /// policy. `None` means the subject ends here.
    fn read(
        subject: &[u8],
        pos: usize,
        policy: InvalidUtf8Policy,
    ) -> Option<(char, usize)> {
        if pos >= subject.len() {
            return None;
        }
        match utf8::decode(&subject[pos..]) {
            Some(decoded) => Some(decoded),
            None => match policy {
                InvalidUtf8Policy::Replace => {
                    Some((char::REPLACEMENT_CHARACTER, 1))
                }
                InvalidUtf8Policy::Truncate => None,
            },
        }
    }
}
