//! gowm :: a minimal workspace window manager for X11
//!
//! Every workspace holds at most one window, shown full screen on the monitor that the
//! workspace is bound to. Log output goes to stderr and is filtered using the `GOWM_LOG`
//! environment variable (e.g. `GOWM_LOG=debug`).
use gowm::{core::WindowManager, x11rb::Conn, Config};
use std::{env, process};
use tracing::error;
use tracing_subscriber::{self, prelude::*, EnvFilter};

const LOG_ENV_VAR: &str = "GOWM_LOG";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && args[1] == "-v" {
        println!("gowm-{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    } else if args.len() > 1 {
        eprintln!("usage: gowm [-v]");
        process::exit(1);
    }

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .finish()
        .init();

    let config = Config::default();

    let conn = match Conn::new(config.indicator_font.clone()) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("gowm: unable to open display: {e}");
            process::exit(1);
        }
    };

    let res = WindowManager::new(config, conn).and_then(|wm| wm.run());

    if let Err(e) = res {
        error!(%e, "exiting");
        eprintln!("gowm: {e}");
        process::exit(1);
    }
}
