use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use excov::format::{self, FormatError};
use excov::{NameWriter, ReduceOptions, Reducer, Solver, UndoLog};

/// Solve exact cover instances read from stdin.
///
/// Each input line is one candidate row; solutions are written to stdout
/// as the `|`-terminated names of the selected rows, one cover per line.
/// Diagnostics go to stderr through the logger (set RUST_LOG to override
/// the default `info` level).
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Skip all reduction passes
    #[arg(long)]
    noreduce: bool,

    /// Lookahead budget seed for reduction probes
    #[arg(long, value_name = "N", default_value_t = 1000)]
    reducetries: u64,

    /// Reduce, write the reduced matrix to stdout, and exit
    #[arg(long)]
    onlyreduce: bool,

    /// Enable the group reduction pass
    #[arg(long)]
    reducegroups: bool,

    /// Read the numeric input format instead of dense 0/1 rows
    #[arg(long)]
    numeric: bool,

    /// Write the matrix to reduced.ec after each productive round
    #[arg(long)]
    save_intermediate: bool,
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info")); // RUST_LOG
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, FormatError> {
    let stdin = io::stdin();
    let mut mat = if args.numeric {
        format::read_numeric(stdin.lock())?
    } else {
        format::read_dense(stdin.lock())?
    };
    info!("read {} rows over {} columns", mat.num_rows(), mat.num_cols());

    let empties = mat.empty_cols();
    if !empties.is_empty() {
        for c in &empties {
            error!("column {} is empty", c);
        }
        error!("impossible exact cover");
        return Ok(ExitCode::SUCCESS);
    }

    let mut log = UndoLog::new();
    let mut reducer = Reducer::new(ReduceOptions {
        tries: args.reducetries,
        groups: args.reducegroups,
        save_intermediate: args.save_intermediate,
        numeric: args.numeric,
    });
    if !args.noreduce {
        reducer.run(&mut mat, &mut log);
    }

    // The log must be reverted before an early return can drop it.
    let result = if args.onlyreduce {
        write_reduced(&mat, args.numeric)
    } else {
        enumerate(&mut mat)
    };
    log.revert(&mut mat);
    result?;
    Ok(ExitCode::SUCCESS)
}

fn write_reduced(mat: &excov::Matrix, numeric: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if numeric {
        format::write_numeric(mat, &mut out)?;
    } else {
        format::write_dense(mat, &mut out)?;
    }
    out.flush()
}

fn enumerate(mat: &mut excov::Matrix) -> io::Result<()> {
    let stdout = io::stdout();
    let mut sink = NameWriter::new(BufWriter::new(stdout.lock()));
    let mut solver = Solver::new();
    solver.solve(mat, &mut sink);

    let secs = solver.elapsed().as_secs_f64();
    info!("total time {:.3}s", secs);
    info!(
        "{} solutions ({:.2}/sec), {} calls to solve",
        solver.stats.solutions,
        solver.stats.solutions as f64 / secs.max(f64::EPSILON),
        solver.stats.calls
    );

    sink.into_result().map(|_| ())
}
