//! Shared scaffolding for the integration suites: a scriptable host and
//! small program-building helpers.
#![allow(dead_code)]

use dxbc_vm::prelude::*;

/// Host double that answers math intrinsics with std implementations and
/// records every debug message. Sampling returns a fixed value so tests can
/// assert the plumbing without a GPU.
#[derive(Default)]
pub struct MockHost {
    pub current_instruction: usize,
    pub messages: Vec<String>,
    pub sample_result: Option<ShaderValue>,
    pub sample_count: u32,
    pub buffer_elements: u32,
    pub resource: ResourceInfo,
    pub fail_math: bool,
    pub sample_requests: Vec<SampleGatherArgs>,
}

impl GpuHost for MockHost {
    fn set_current_instruction(&mut self, index: usize) {
        self.current_instruction = index;
    }

    fn math_intrinsic(
        &mut self,
        opcode: Opcode,
        src: &ShaderValue,
    ) -> Option<(ShaderValue, ShaderValue)> {
        if self.fail_math {
            return None;
        }
        let mut a = ShaderValue::zero();
        let mut b = ShaderValue::zero();
        for lane in 0..4 {
            let x = src.f32_bcast(lane);
            let (pa, pb) = match opcode {
                Opcode::Rcp => (x.recip(), 0.0),
                Opcode::Rsq => (x.sqrt().recip(), 0.0),
                Opcode::Sqrt => (x.sqrt(), 0.0),
                Opcode::Exp => (x.exp2(), 0.0),
                Opcode::Log => (x.log2(), 0.0),
                Opcode::Sincos => x.sin_cos(),
                _ => return None,
            };
            a.set_f32(lane, pa);
            b.set_f32(lane, pb);
        }
        Some((a, b))
    }

    fn sample_gather(&mut self, args: SampleGatherArgs) -> Option<ShaderValue> {
        self.sample_requests.push(args);
        self.sample_result.clone()
    }

    fn sample_info(&mut self, _operand_type: OperandType, _slot: u32) -> u32 {
        self.sample_count
    }

    fn buffer_info(&mut self, _operand_type: OperandType, _slot: u32) -> u32 {
        self.buffer_elements
    }

    fn resource_info(&mut self, _operand_type: OperandType, _slot: u32, _mip: u32) -> ResourceInfo {
        self.resource
    }

    fn add_debug_message(
        &mut self,
        _category: DebugMessageCategory,
        _severity: DebugMessageSeverity,
        _source: DebugMessageSource,
        text: String,
    ) {
        self.messages.push(text);
    }
}

/// A program over `instructions` with `temps` temporary registers declared.
pub fn program(temps: u32, instructions: Vec<Instruction>) -> Program {
    Program {
        declarations: vec![Declaration::Temps { count: temps }],
        instructions,
        ..Program::default()
    }
}

/// Run a single lane to completion and return its final state.
pub fn run(program: &Program, global: &mut GlobalState, host: &mut MockHost) -> InvocationState {
    let mut state = InvocationState::new(program, LaneInit::default());
    let mut steps = 0;
    while !state.finished(program) {
        match state.step(program, global, host, None) {
            StepOutcome::Advanced => {}
            StepOutcome::Stalled => panic!("unexpected stall at pc {}", state.program_counter),
            StepOutcome::Trapped(trap) => panic!("trap: {trap}"),
        }
        steps += 1;
        assert!(steps < 10_000, "runaway program");
    }
    state
}

/// `mov dst, src`.
pub fn mov(dst: Operand, src: Operand) -> Instruction {
    Instruction::new(Opcode::Mov).push(dst).push(src)
}

/// Scalar float literal operand.
pub fn fimm(v: f32) -> Operand {
    Operand::imm32_scalar(v.to_bits())
}
