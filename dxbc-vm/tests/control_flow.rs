//! Structured-control-flow behaviour over whole programs.

mod common;

use common::{fimm, mov, program, run, MockHost};
use dxbc_vm::prelude::*;

fn uimm(v: u32) -> Operand {
    Operand::imm32_scalar(v)
}

#[test]
fn if_with_zero_predicate_takes_the_else_branch() {
    // if pred=0 ; r0.x = 1 ; else ; r0.x = 2 ; endif
    let p = program(
        1,
        vec![
            Instruction::new(Opcode::If).push(uimm(0)),
            mov(Operand::temp(0).mask(&[0]), fimm(1.0)),
            Instruction::new(Opcode::Else),
            mov(Operand::temp(0).mask(&[0]), fimm(2.0)),
            Instruction::new(Opcode::EndIf),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert_eq!(state.registers[0].f32(0), 2.0);
}

#[test]
fn if_with_nonzero_predicate_takes_the_then_branch() {
    let p = program(
        1,
        vec![
            Instruction::new(Opcode::If).push(uimm(1)),
            mov(Operand::temp(0).mask(&[0]), fimm(1.0)),
            Instruction::new(Opcode::Else),
            mov(Operand::temp(0).mask(&[0]), fimm(2.0)),
            Instruction::new(Opcode::EndIf),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert_eq!(state.registers[0].f32(0), 1.0);
}

#[test]
fn loop_counts_down_and_breaks() {
    // r0.x = 4; r1.x = 0
    // loop:
    //   breakc_nz (r0.x == 0)
    //   r1.x = r1.x + 1
    //   r0.x = r0.x + (-1)
    // endloop
    let p = program(
        2,
        vec![
            mov(Operand::temp(0).mask(&[0]), uimm(4)),
            mov(Operand::temp(1).mask(&[0]), uimm(0)),
            Instruction::new(Opcode::Loop),
            Instruction::new(Opcode::IEq)
                .push(Operand::temp(2).mask(&[0]))
                .push(Operand::temp(0).select(0))
                .push(uimm(0)),
            Instruction::new(Opcode::Breakc)
                .push(Operand::temp(2).select(0)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(1).mask(&[0]))
                .push(Operand::temp(1).select(0))
                .push(uimm(1)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(0).mask(&[0]))
                .push(Operand::temp(0).select(0))
                .push(uimm(u32::MAX)),
            Instruction::new(Opcode::EndLoop),
        ],
    );
    // r2 holds the exit comparison.
    let p = Program {
        declarations: vec![Declaration::Temps { count: 3 }],
        ..p
    };
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert_eq!(state.registers[1].u32(0), 4);
    assert_eq!(state.registers[0].u32(0), 0);
}

#[test]
fn continue_skips_the_rest_of_the_body() {
    // Counts iterations in r1 but only even values of the counter reach the
    // tail that sums into r2.
    // r0.x = 4
    // loop:
    //   breakc (r0.x == 0)
    //   r0.x += -1
    //   r1.x += 1
    //   continuec (r0.x & 1)
    //   r2.x += 1
    // endloop
    let p = program(
        3,
        vec![
            mov(Operand::temp(0).mask(&[0]), uimm(4)),
            Instruction::new(Opcode::Loop),
            Instruction::new(Opcode::IEq)
                .push(Operand::temp(2).mask(&[3]))
                .push(Operand::temp(0).select(0))
                .push(uimm(0)),
            Instruction::new(Opcode::Breakc)
                .push(Operand::temp(2).select(3)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(0).mask(&[0]))
                .push(Operand::temp(0).select(0))
                .push(uimm(u32::MAX)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(1).mask(&[0]))
                .push(Operand::temp(1).select(0))
                .push(uimm(1)),
            Instruction::new(Opcode::And)
                .push(Operand::temp(2).mask(&[0]))
                .push(Operand::temp(0).select(0))
                .push(uimm(1)),
            Instruction::new(Opcode::Continuec)
                .push(Operand::temp(2).select(0)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(2).mask(&[1]))
                .push(Operand::temp(2).select(1))
                .push(uimm(1)),
            Instruction::new(Opcode::EndLoop),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert_eq!(state.registers[1].u32(0), 4);
    // Counter values 3, 2, 1, 0 after decrement; odd ones continue.
    assert_eq!(state.registers[2].u32(1), 2);
}

#[test]
fn switch_dispatches_on_the_bit_pattern() {
    let case = |v: u32| Instruction::new(Opcode::Case).push(uimm(v));
    let build = |selector: u32| {
        program(
            1,
            vec![
                Instruction::new(Opcode::Switch).push(uimm(selector)),
                case(10),
                mov(Operand::temp(0).mask(&[0]), uimm(100)),
                Instruction::new(Opcode::Break),
                case(20),
                mov(Operand::temp(0).mask(&[0]), uimm(200)),
                Instruction::new(Opcode::Break),
                Instruction::new(Opcode::Default),
                mov(Operand::temp(0).mask(&[0]), uimm(999)),
                Instruction::new(Opcode::EndSwitch),
            ],
        )
    };
    for (selector, expected) in [(10, 100), (20, 200), (77, 999)] {
        let state = run(
            &build(selector),
            &mut GlobalState::default(),
            &mut MockHost::default(),
        );
        assert_eq!(state.registers[0].u32(0), expected, "selector {selector}");
    }
}

#[test]
fn ret_marks_done_and_skips_the_tail() {
    let p = program(
        1,
        vec![
            mov(Operand::temp(0).mask(&[0]), uimm(1)),
            Instruction::new(Opcode::Ret),
            mov(Operand::temp(0).mask(&[0]), uimm(2)),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert!(state.done);
    assert_eq!(state.registers[0].u32(0), 1);
}

#[test]
fn retc_only_returns_when_the_predicate_passes() {
    let p = program(
        1,
        vec![
            Instruction::new(Opcode::Retc).push(uimm(0)),
            mov(Operand::temp(0).mask(&[0]), uimm(5)),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert!(!state.done);
    assert_eq!(state.registers[0].u32(0), 5);
}

#[test]
fn discard_terminates_the_invocation() {
    let p = program(
        1,
        vec![
            Instruction::new(Opcode::Discard).push(uimm(1)),
            mov(Operand::temp(0).mask(&[0]), uimm(5)),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert!(state.done);
    assert_eq!(state.registers[0].u32(0), 0);
}

#[test]
fn nested_loops_with_breaks_terminate() {
    // Outer loop runs twice, inner loop breaks immediately.
    let p = program(
        2,
        vec![
            mov(Operand::temp(0).mask(&[0]), uimm(2)),
            Instruction::new(Opcode::Loop),
            Instruction::new(Opcode::IEq)
                .push(Operand::temp(1).mask(&[3]))
                .push(Operand::temp(0).select(0))
                .push(uimm(0)),
            Instruction::new(Opcode::Breakc)
                .push(Operand::temp(1).select(3)),
            Instruction::new(Opcode::Loop),
            Instruction::new(Opcode::Break),
            Instruction::new(Opcode::EndLoop),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(0).mask(&[0]))
                .push(Operand::temp(0).select(0))
                .push(uimm(u32::MAX)),
            Instruction::new(Opcode::IAdd)
                .push(Operand::temp(1).mask(&[0]))
                .push(Operand::temp(1).select(0))
                .push(uimm(1)),
            Instruction::new(Opcode::EndLoop),
        ],
    );
    let state = run(&p, &mut GlobalState::default(), &mut MockHost::default());
    assert_eq!(state.registers[1].u32(0), 2);
}
