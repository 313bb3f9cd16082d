use std::sync::Arc;

mod config;
mod contact;
mod handler;
mod http;
mod logger;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_config_path(std::env::args().skip(1));
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    logger::log_server_start(&addr, &cfg, &state.persistence);

    let shutdown = Arc::new(server::ShutdownSignal::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}

/// `--config <path>` / `-c <path>`, defaulting to `config` (config.toml)
fn parse_config_path(mut args: impl Iterator<Item = String>) -> String {
    while let Some(arg) = args.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
        if arg == "--config" || arg == "-c" {
            if let Some(path) = args.next() {
                return path;
            }
        }
    }
    config::DEFAULT_CONFIG_PATH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_config_path_default() {
        assert_eq!(parse_config_path(args(&[])), "config");
        assert_eq!(parse_config_path(args(&["--config"])), "config");
    }

    #[test]
    fn test_config_path_flags() {
        assert_eq!(parse_config_path(args(&["-c", "/etc/energy"])), "/etc/energy");
        assert_eq!(parse_config_path(args(&["--config", "prod"])), "prod");
        assert_eq!(parse_config_path(args(&["--config=staging"])), "staging");
    }
}
