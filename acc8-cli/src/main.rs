//! Entrypoint for CLI
mod conf;
mod error;

use std::{env, fs, time::Instant};

use acc8::prelude::*;
use acc8_compiler::{compile_source, ProgramReport};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

use crate::{
    conf::AppConf,
    error::{AppError, ErrorKind},
};

static USAGE: &str = r#"
usage: acc8 CMD FILE [--config CONF.yaml] [--verbose]

commands:
    compile Compile every program in the source file, writing one image per program
    run     Compile every program in the source file and execute the images
    exec    Execute a 256 byte image file
    dis     Disassemble a 256 byte image file

examples:
    acc8 compile programs.acc8
    acc8 run programs.acc8 --config acc8.yaml
    acc8 exec program-1.img
    acc8 dis program-1.img
"#;

fn main() {
    let args = match parse_args() {
        Some(args) => args,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1)
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let conf = match &args.config {
        Some(path) => AppConf::load(path),
        None => Ok(AppConf::default()),
    };

    let verbose = args.verbose || conf.as_ref().map_or(false, |conf| conf.verbose);
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    // Only fails when a logger was already installed.
    let _ = SimpleLogger::new().with_level(level).env().init();

    let conf = conf?;

    match args.cmd {
        Cmd::Compile => run_compiler(&args.filepath, &conf),
        Cmd::Run => run_programs(&args.filepath, &conf),
        Cmd::Exec => run_image(&args.filepath, &conf),
        Cmd::Dis => run_disassembler(&args.filepath),
    }
}

fn compile_file(filepath: &str, conf: &AppConf) -> Result<Vec<ProgramReport>, AppError> {
    let source = String::from_utf8(fs::read(filepath)?)?;

    info!("compiling {filepath}");
    let reports = compile_source(&source);
    for report in &reports {
        println!("{}", report.render(&conf.compiler));
    }

    Ok(reports)
}

fn run_compiler(filepath: &str, conf: &AppConf) -> Result<(), AppError> {
    let reports = compile_file(filepath, conf)?;

    for report in &reports {
        if let Some(image) = report.image() {
            let outpath = format!("program-{}.img", report.number);
            fs::write(&outpath, image.as_bytes())?;
            info!("wrote program {} to {outpath}", report.number);
        }
    }

    check_failures(reports.iter().filter(|report| !report.success()).count())
}

fn run_programs(filepath: &str, conf: &AppConf) -> Result<(), AppError> {
    let reports = compile_file(filepath, conf)?;
    let mut failures = 0;

    for report in &reports {
        let image = match report.image() {
            Some(image) => image,
            None => {
                failures += 1;
                continue;
            }
        };

        println!("Running program {}", report.number);
        if let Err(err) = execute(image.as_bytes(), &conf.vm) {
            error!("program {}: {err}", report.number);
            failures += 1;
        }
    }

    check_failures(failures)
}

fn run_image(filepath: &str, conf: &AppConf) -> Result<(), AppError> {
    let image = fs::read(filepath)?;
    execute(&image, &conf.vm)?;
    Ok(())
}

fn execute(image: &[u8], conf: &Acc8Conf) -> Acc8Result<()> {
    let mut vm = Acc8Vm::new(conf.clone());
    vm.load_image(image)?;

    let start = Instant::now();
    let result = vm.execute();
    let end = Instant::now();

    println!("{}", vm.output());
    info!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    let steps = result?;
    info!("halted after {steps} steps");

    Ok(())
}

fn run_disassembler(filepath: &str) -> Result<(), AppError> {
    let image = fs::read(filepath)?;

    let mut buf = String::new();
    Disassembler::new(&image)
        .disassemble(&mut buf)
        .map_err(Acc8Error::from)?;
    println!("{buf}");

    Ok(())
}

fn check_failures(failures: usize) -> Result<(), AppError> {
    if failures == 0 {
        Ok(())
    } else {
        Err(ErrorKind::Failed(failures).into())
    }
}

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);

    let cmd = match args.next()?.as_str() {
        "compile" => Cmd::Compile,
        "run" => Cmd::Run,
        "exec" => Cmd::Exec,
        "dis" => Cmd::Dis,
        _ => return None,
    };

    let mut filepath = None;
    let mut config = None;
    let mut verbose = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next()?),
            "--verbose" | "-v" => verbose = true,
            _ if filepath.is_none() => filepath = Some(arg),
            _ => return None,
        }
    }

    Some(Args {
        cmd,
        filepath: filepath?,
        config,
        verbose,
    })
}

fn print_usage() {
    println!("acc8 v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

struct Args {
    cmd: Cmd,
    filepath: String,
    config: Option<String>,
    verbose: bool,
}

enum Cmd {
    /// Compile source into images
    Compile,
    /// Compile and execute
    Run,
    /// Execute an image
    Exec,
    /// Disassemble an image
    Dis,
}
