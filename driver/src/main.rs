use adjcore::orchestrator::FailurePolicy;
use anyhow::bail;
use clap::{Parser, ValueEnum};
use generator::{generate_dataset, DemoConfig};
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod archive;
mod generator;
mod reference;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Log failing stations and keep the rest
    Skip,
    /// Stop the run at the first failing station
    Abort,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => FailurePolicy::Skip,
            PolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Prepare adjoint sources from paired observed/synthetic archives")]
struct Args {
    /// Parameter descriptor (YAML)
    #[arg(short = 'p', long = "param")]
    param: Option<PathBuf>,
    /// Path descriptor (JSON)
    #[arg(short = 'f', long = "path")]
    path: Option<PathBuf>,
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// Components the window parameters must cover
    #[arg(long, value_delimiter = ',', default_value = "Z,R,T")]
    components: Vec<String>,
    #[arg(long, value_enum, default_value_t = PolicyArg::Skip)]
    policy: PolicyArg,
    /// Process stations one after another instead of on the worker pool
    #[arg(long, default_value_t = false)]
    sequential: bool,
    /// Write a demo dataset into this directory (and run on it unless -p/-f are given)
    #[arg(long)]
    generate: Option<PathBuf>,
    /// Seed for the demo dataset noise
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let (param_file, path_file) = match (&args.generate, args.param, args.path) {
        (_, Some(param), Some(path)) => (param, path),
        (Some(dir), None, None) => {
            let config = DemoConfig {
                seed: args.seed,
                ..DemoConfig::default()
            };
            let files = generate_dataset(dir, &config)?;
            println!(
                "Demo dataset -> {} and {}",
                files.observed.display(),
                files.synthetic.display()
            );
            (files.param_file, files.path_file)
        }
        _ => bail!("pass both -p <param.yml> and -f <path.json>, or --generate <dir>"),
    };

    let mut config = WorkflowConfig::new(param_file, path_file);
    config.components = args.components;
    config.policy = args.policy.into();
    config.parallel = !args.sequential;
    config.verbose = args.verbose;

    let summary = Runner::new(config).execute()?;
    println!(
        "Run -> matched {}, processed {}, empty {}, failed {}",
        summary.matched, summary.processed, summary.empty, summary.failed
    );
    for (station, message) in &summary.failures {
        println!("  {station}: {message}");
    }
    Ok(())
}
