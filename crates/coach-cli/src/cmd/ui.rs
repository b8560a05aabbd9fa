use anyhow::Context;
use coach_core::config::Config;
use coach_core::Session;
use std::path::Path;

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

pub fn run(config_path: &Path, port: u16, no_open: bool, live: bool) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if live {
        config.demo_mode = false;
    }
    for w in config.validate() {
        tracing::warn!("{}", w.message);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        let mode = if config.demo_mode { "demo" } else { "live" };
        println!("coach UI ({mode} mode) → http://localhost:{actual_port}");

        // The session is created inside the runtime so its countdown starts.
        let session = Session::new(config);
        tokio::select! {
            res = coach_server::serve_on(session, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
