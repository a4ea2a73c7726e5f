//! Structured-control-flow resolution by depth-counted linear scan.
//!
//! The instruction stream is flat; branch targets are found at decision time
//! by walking it while tracking nesting depth. A malformed stream (no
//! matching label) resolves past the end of the program, which terminates
//! the invocation instead of faulting.

use dxbc_asm::{Opcode, Program};

#[cfg(test)]
mod tests;

fn opcode_at(program: &Program, index: usize) -> Option<Opcode> {
    program.instruction(index).map(|i| i.opcode)
}

/// Target for an IF whose predicate failed: just past the matching ELSE, or
/// just past the matching ENDIF when there is no ELSE.
pub(crate) fn after_if_false(program: &Program, pc: usize) -> usize {
    let mut depth = 1u32;
    let mut i = pc + 1;
    while let Some(op) = opcode_at(program, i) {
        match op {
            Opcode::If => depth += 1,
            Opcode::Else if depth == 1 => return i + 1,
            Opcode::EndIf => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    tracing::warn!(pc, "unmatched if, terminating invocation");
    program.num_instructions()
}

/// Target for a taken ELSE: just past the matching ENDIF.
pub(crate) fn after_endif(program: &Program, pc: usize) -> usize {
    let mut depth = 1u32;
    let mut i = pc + 1;
    while let Some(op) = opcode_at(program, i) {
        match op {
            Opcode::If => depth += 1,
            Opcode::EndIf => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    tracing::warn!(pc, "unmatched else, terminating invocation");
    program.num_instructions()
}

/// Step past a run of contiguous CASE / DEFAULT labels so the next step
/// lands on a real instruction.
fn past_labels(program: &Program, mut i: usize) -> usize {
    while let Some(op) = opcode_at(program, i) {
        if matches!(op, Opcode::Case | Opcode::Default) {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Target for SWITCH: the first CASE whose literal equals `value` bitwise,
/// else the first DEFAULT, else just past the matching ENDSWITCH.
pub(crate) fn switch_target(program: &Program, pc: usize, value: u32) -> usize {
    let mut depth = 1u32;
    let mut i = pc + 1;
    let mut default_label = None;
    while let Some(instr) = program.instruction(i) {
        match instr.opcode {
            Opcode::Switch => depth += 1,
            Opcode::EndSwitch => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Opcode::Case if depth == 1 => {
                let case_value = instr.operands.first().map(|o| o.values[0]).unwrap_or(0);
                if case_value == value {
                    return past_labels(program, i + 1);
                }
            }
            Opcode::Default if depth == 1 => {
                if default_label.is_none() {
                    default_label = Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    match default_label {
        Some(d) => past_labels(program, d + 1),
        // Fall to just past ENDSWITCH (or the end of a malformed stream).
        None => (i + 1).min(program.num_instructions()),
    }
}

/// Target for a taken BREAK: just past the end of the innermost enclosing
/// loop or switch.
pub(crate) fn after_break(program: &Program, pc: usize) -> usize {
    let mut depth = 1u32;
    let mut i = pc + 1;
    while let Some(op) = opcode_at(program, i) {
        match op {
            Opcode::Loop | Opcode::Switch => depth += 1,
            Opcode::EndLoop | Opcode::EndSwitch => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    tracing::warn!(pc, "break outside any loop or switch, terminating invocation");
    program.num_instructions()
}

/// Target for a taken CONTINUE or for ENDLOOP: the innermost enclosing LOOP
/// label, found by scanning backward.
pub(crate) fn loop_start(program: &Program, pc: usize) -> usize {
    let mut depth = 1u32;
    let mut i = pc;
    while i > 0 {
        i -= 1;
        match opcode_at(program, i) {
            Some(Opcode::EndLoop) => depth += 1,
            Some(Opcode::Loop) => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tracing::warn!(pc, "continue outside any loop, terminating invocation");
    program.num_instructions()
}
