mod pages;
mod service;

use std::{
    env::consts::EXE_SUFFIX,
    path::{Path, PathBuf},
    sync::Arc,
};

use agenda::{error::LoadError, query::Catalog};

#[derive(clap::Parser)]
#[command(about = "Browse and search an extracted agenda dataset")]
struct Args {
    #[arg(long, env = "AGENDA_DATA", default_value = "ncsl_sessions.json")]
    data: PathBuf,
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,
    /// Serve on a unix socket instead of `--bind`.
    #[arg(long)]
    sock: Option<PathBuf>,
    /// Do not run the extractor when the data file is missing.
    #[arg(long)]
    no_bootstrap: bool,
    /// Extractor binary; defaults to `agenda-extract` next to this one.
    #[arg(long)]
    extractor: Option<PathBuf>,
}

fn sibling_extractor() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.with_file_name(format!("agenda-extract{EXE_SUFFIX}")))
}

async fn bootstrap(extractor: &Path, data: &Path) {
    tracing::warn!(target: "bootstrap", "{} missing, running {}", data.display(), extractor.display());
    match tokio::process::Command::new(extractor)
        .arg("--output")
        .arg(data)
        .status()
        .await
    {
        Ok(status) if status.success() => tracing::info!(target: "bootstrap", "extraction finished"),
        Ok(status) => tracing::error!(target: "bootstrap", "\x1b[31mextractor exited with {status}\x1b[0m"),
        Err(e) => tracing::error!(target: "bootstrap", "\x1b[31mcannot run extractor: {e}\x1b[0m"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::serve;
    use clap::Parser;
    use tokio::net::{TcpListener, UnixListener};

    pretty_env_logger::init_timed();

    let args = Args::parse();

    if !args.no_bootstrap && !args.data.exists() {
        let extractor = match args.extractor {
            Some(p) => p,
            None => sibling_extractor()?,
        };
        bootstrap(&extractor, &args.data).await;
    }

    let catalog = match Catalog::load(&args.data) {
        Ok(c) => c,
        Err(e @ LoadError::Missing(_)) => {
            tracing::warn!(target: "main", "{e}; serving an empty catalog");
            Catalog::empty()
        }
        Err(e) => {
            tracing::error!(target: "main", "\x1b[31m{e}; serving an empty catalog\x1b[0m");
            Catalog::empty()
        }
    };

    let app = service::router(Arc::new(catalog));

    if let Some(sock) = args.sock {
        if let Err(err) = std::fs::remove_file(&sock) && err.kind() != std::io::ErrorKind::NotFound {
            return Err(err.into());
        }
        tracing::info!(target: "main", "listening on {}", sock.display());
        serve(UnixListener::bind(&sock)?, app).await?;
    } else {
        let listener = TcpListener::bind(&args.bind).await?;
        tracing::info!(target: "main", "listening on http://{}", listener.local_addr()?);
        serve(listener, app).await?;
    }

    Ok(())
}
