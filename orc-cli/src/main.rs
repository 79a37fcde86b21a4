//! `orcc`: a thin harness for exercising `orc-core`'s pipeline against the
//! in-tree `TestTarget`. Not a product surface — see `orc-core::testutil`.

use anyhow::{bail, Result};
use clap::Parser;

use orc_core::config::CompilerFlags;
use orc_core::insn::Instruction;
use orc_core::program::Program;
use orc_core::testutil::{accsumw, addw, copyw, TestTarget};
use orc_core::var::{VarTable, Variable};

/// Build and compile one of a small set of built-in sample programs against the
/// in-process test target, and print the result.
#[derive(Parser, Debug)]
#[command(name = "orcc", about = "Development harness for the orc-core compiler pipeline")]
struct Cli {
    /// Which built-in sample program to compile.
    #[arg(value_enum, default_value_t = Sample::Copy)]
    sample: Sample,

    /// Dump the generated assembly text and result code to stdout.
    #[arg(long, default_value_t = true)]
    dump: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum Sample {
    /// `copyw D1, S1` — spec.md §8 Scenario 1.
    Copy,
    /// `copyw T1, S1 / addw T1, T1, S1 / copyw D1, T1` — forces a Temp
    /// duplicate on the second definition (spec.md §8 Scenario 2).
    TempReuse,
    /// `accsumw A1, S1` — an accumulator destination, live across the whole
    /// program.
    Accumulate,
}

fn build_sample(sample: &Sample) -> Result<Program> {
    let mut vars = VarTable::new();
    match sample {
        Sample::Copy => {
            let s1 = vars.push(Variable::src("S1", 2))?;
            let d1 = vars.push(Variable::dest("D1", 2))?;
            let insns = vec![Instruction::new(copyw(), [s1], [d1])];
            Ok(Program::new("copy", vars, 0, insns)?)
        }
        Sample::TempReuse => {
            let s1 = vars.push(Variable::src("S1", 2))?;
            let d1 = vars.push(Variable::dest("D1", 2))?;
            let t1 = vars.push(Variable::temp("T1", 2))?;
            let insns = vec![
                Instruction::new(copyw(), [s1], [t1]),
                Instruction::new(addw(), [t1, s1], [t1]),
                Instruction::new(copyw(), [t1], [d1]),
            ];
            Ok(Program::new("temp-reuse", vars, 1, insns)?)
        }
        Sample::Accumulate => {
            let s1 = vars.push(Variable::src("S1", 2))?;
            let a1 = vars.push(Variable::accumulator("A1", 2))?;
            let insns = vec![Instruction::new(accsumw(), [s1], [a1])];
            Ok(Program::new("accumulate", vars, 0, insns)?)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let flags = CompilerFlags::from_env()?;
    let mut program = build_sample(&cli.sample)?;
    let target = TestTarget::new();

    let result = orc_core::compile(&mut program, Some(&target), None, flags);
    if !cli.dump {
        return Ok(());
    }

    println!("result: {}", result);
    match &program.asm_code {
        Some(asm) => print!("{}", asm),
        None => println!("(no assembly generated)"),
    }

    if result.fatal() {
        bail!("program `{}` was rejected: {}", program.name, result);
    }
    Ok(())
}
