use clap::Parser;
use provisioner_cli::cmd::deploy::{self, DeployArgs};
use provisioner_cli::{exit_code, is_config_error, logging};

#[derive(Parser)]
#[command(
    name = "provisioner",
    about = "Log in to the state backend, select the stack, build the model and run the engine",
    version
)]
struct Cli {
    #[command(flatten)]
    args: DeployArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(tracing::Level::INFO);

    if let Err(e) = deploy::run(cli.args) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        if is_config_error(&e) {
            eprintln!("hint: run `provisioner --help` for the settings and their env vars");
        }
        std::process::exit(exit_code(&e));
    }
}
