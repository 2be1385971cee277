use daemon_mcp::Service;
use daemon_mcp::config::Config;
use daemon_mcp::http::Server;
use daemon_mcp::source::HttpSource;
use logwise::privacy::LogIt;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("daemon_mcp: {e}");
            return ExitCode::FAILURE;
        }
    };
    let source = HttpSource::new(config.source_url);
    logwise::info_sync!(
        "Serving daemon document from {url}",
        url = LogIt(&source.url())
    );
    let service = Service::new(source);
    let _server = match Server::new(config.listen_addr.as_str(), service) {
        Ok(server) => server,
        Err(e) => {
            logwise::error_sync!("Failed to start server: {e}", e = LogIt(&e));
            eprintln!("daemon_mcp: {e}");
            return ExitCode::FAILURE;
        }
    };
    loop {
        std::thread::park();
    }
}
