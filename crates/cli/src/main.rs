use clap::Parser;

mod args;
mod dataset;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::Args::parse();
    match args.command {
        args::Commands::Split(args) => dataset::split_command(args),
        args::Commands::Build(args) => dataset::build_command(args),
        args::Commands::Pair(args) => dataset::pair_command(args),
    }
}
