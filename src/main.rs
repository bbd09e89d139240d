//! sysup binary entrypoint kept minimal. The full flow lives in `cli`.

fn main() {
    if let Err(err) = sysup::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
