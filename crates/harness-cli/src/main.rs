//! `harness` binary: runs the built-in reference suite

use harness_cli::suite::builtin_registry;
use harness_core::Registry;

fn main() {
    let registry = match builtin_registry().and_then(Registry::install) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(harness_cli::EXIT_USAGE);
        }
    };

    let code = harness_cli::run(std::env::args_os(), registry, &mut std::io::stdout().lock());
    std::process::exit(code);
}
