//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! with wasm-pack and serves `static/` on a local HTTP server.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::process::{Command, Stdio};
    use std::{env, thread, time::Duration};

    use anyhow::{bail, Context};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = env::var("HALO_PORT").unwrap_or_else(|_| "8000".to_string());

    log::info!("building WASM pkg");
    let status = Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
        .context("wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/)")?;
    if !status.success() {
        bail!("wasm-pack finished with {status}");
    }

    log::info!("serving static/ at http://127.0.0.1:{port}");
    let mut server = Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .context("failed to start http server")?;

    loop {
        if let Some(status) = server.try_wait()? {
            bail!("http server exited with {status}");
        }
        thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
