use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Locate the exchange-runner binary next to this one
fn runner_path() -> PathBuf {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    let mut path = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("target/{}", profile)))
        .join("exchange-runner");

    #[cfg(target_os = "windows")]
    path.set_extension("exe");

    path
}

fn main() {
    // Thin proxy: the real work happens in the exchange-runner binary,
    // with any CLI arguments passed straight through.
    let path = runner_path();
    let status = Command::new(&path)
        .args(env::args().skip(1))
        .status()
        .unwrap_or_else(|e| {
            eprintln!("Failed to launch exchange-runner at {:?}: {}", path, e);
            eprintln!("Build it first: cargo build -p exchange-runner");
            std::process::exit(1);
        });

    std::process::exit(status.code().unwrap_or(1));
}
