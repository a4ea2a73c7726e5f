use super::*;
use dxbc_asm::{Instruction, Operand};

fn program(opcodes: &[Opcode]) -> Program {
    Program {
        instructions: opcodes.iter().map(|&op| Instruction::new(op)).collect(),
        ..Program::default()
    }
}

fn case(value: u32) -> Instruction {
    Instruction::new(Opcode::Case).push(Operand::imm32_scalar(value))
}

#[test]
fn if_false_lands_after_else() {
    use Opcode::*;
    // 0:if 1:nop 2:else 3:nop 4:endif
    let p = program(&[If, Nop, Else, Nop, EndIf]);
    assert_eq!(after_if_false(&p, 0), 3);
}

#[test]
fn if_false_without_else_lands_after_endif() {
    use Opcode::*;
    // 0:if 1:nop 2:endif 3:nop
    let p = program(&[If, Nop, EndIf, Nop]);
    assert_eq!(after_if_false(&p, 0), 3);
}

#[test]
fn nested_ifs_are_skipped_whole() {
    use Opcode::*;
    // 0:if 1:if 2:else 3:endif 4:else 5:nop 6:endif
    let p = program(&[If, If, Else, EndIf, Else, Nop, EndIf]);
    assert_eq!(after_if_false(&p, 0), 5);
    // The inner if's else belongs to it, not to the outer scan.
    assert_eq!(after_if_false(&p, 1), 3);
    assert_eq!(after_endif(&p, 4), 7);
}

#[test]
fn unmatched_if_terminates() {
    use Opcode::*;
    let p = program(&[If, Nop, Nop]);
    assert_eq!(after_if_false(&p, 0), 3);
}

#[test]
fn switch_picks_matching_case() {
    use Opcode::*;
    // 0:switch 1:case(1) 2:nop 3:break 4:case(2) 5:case(3) 6:nop 7:default
    // 8:nop 9:endswitch
    let mut p = program(&[
        Switch, Nop, Nop, Break, Nop, Nop, Nop, Default, Nop, EndSwitch,
    ]);
    p.instructions[1] = case(1);
    p.instructions[4] = case(2);
    p.instructions[5] = case(3);
    assert_eq!(switch_target(&p, 0, 1), 2);
    // Contiguous labels are stepped over together.
    assert_eq!(switch_target(&p, 0, 2), 6);
    assert_eq!(switch_target(&p, 0, 3), 6);
    // No match goes to the remembered default.
    assert_eq!(switch_target(&p, 0, 99), 8);
}

#[test]
fn switch_without_default_falls_past_endswitch() {
    use Opcode::*;
    let mut p = program(&[Switch, Nop, Nop, EndSwitch, Nop]);
    p.instructions[1] = case(7);
    assert_eq!(switch_target(&p, 0, 8), 4);
}

#[test]
fn switch_ignores_nested_switch_cases() {
    use Opcode::*;
    // 0:switch 1:case(1) 2:switch 3:case(2) 4:nop 5:endswitch 6:break
    // 7:endswitch
    let mut p = program(&[
        Switch, Nop, Switch, Nop, Nop, EndSwitch, Break, EndSwitch,
    ]);
    p.instructions[1] = case(1);
    p.instructions[3] = case(2);
    // Value 2 only exists in the nested switch; the outer scan must not see
    // it and falls past its own endswitch.
    assert_eq!(switch_target(&p, 0, 2), 8);
}

#[test]
fn break_exits_the_innermost_construct() {
    use Opcode::*;
    // 0:loop 1:break 2:endloop 3:nop
    let p = program(&[Loop, Break, EndLoop, Nop]);
    assert_eq!(after_break(&p, 1), 3);

    // 0:loop 1:switch 2:break 3:endswitch 4:endloop
    let p = program(&[Loop, Switch, Break, EndSwitch, EndLoop]);
    assert_eq!(after_break(&p, 2), 4);
}

#[test]
fn continue_rewinds_to_the_loop_head() {
    use Opcode::*;
    // 0:nop 1:loop 2:nop 3:continue 4:endloop
    let p = program(&[Nop, Loop, Nop, Continue, EndLoop]);
    assert_eq!(loop_start(&p, 3), 1);
    assert_eq!(loop_start(&p, 4), 1);

    // Nested: 0:loop 1:loop 2:endloop 3:continue 4:endloop
    let p = program(&[Loop, Loop, EndLoop, Continue, EndLoop]);
    assert_eq!(loop_start(&p, 3), 0);
    assert_eq!(loop_start(&p, 2), 1);
}
