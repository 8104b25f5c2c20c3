use clap::Parser;
use provisioner_cli::cmd::purge::{self, PurgeArgs};
use provisioner_cli::{exit_code, logging};

#[derive(Parser)]
#[command(
    name = "purge-stack",
    about = "Drop MySQL providers for vanished RDS endpoints (and their resources) from a stack",
    version
)]
struct Cli {
    #[command(flatten)]
    args: PurgeArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(tracing::Level::INFO);

    if let Err(e) = purge::run(cli.args) {
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}
