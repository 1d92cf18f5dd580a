// src/main.rs

use anyhow::Context;
use log::{error, info};
use softframe::config::Config;
use std::process::ExitCode;

/// Main entry point for the `softframe` demo.
fn main() -> ExitCode {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting softframe...");

    match run() {
        Ok(()) => {
            info!("softframe exited cleanly.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}. Root cause: {:?}. Exiting.", e, e.root_cause());
            ExitCode::FAILURE
        }
    }
}

#[cfg(any(target_os = "linux", windows))]
fn run() -> anyhow::Result<()> {
    use softframe::app::App;
    use softframe::platform::{NativeWindow, PlatformWindow};
    use softframe::renderer::Renderer;

    let config = Config::from_env().context("Failed to load configuration")?;

    let mut window = NativeWindow::open(
        config.window.width,
        config.window.height,
        &config.window.title,
    )
    .context("Failed to initialize window")?;

    // On failure `window` drops here and releases its handles.
    let mut renderer = Renderer::create(&window).context("Failed to initialize renderer")?;

    let frames = App::new(&config).run(&mut window, &mut renderer);
    info!("Presented {} frames.", frames);

    // Renderer first: it must not outlive the window it presents to.
    renderer.destroy();
    window.close();
    Ok(())
}

#[cfg(not(any(target_os = "linux", windows)))]
fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    anyhow::bail!(
        "Failed to initialize window '{}': no native window backend for this platform",
        config.window.title
    )
}
