/*!
A stateless Model Context Protocol (MCP) server for a personal "daemon" profile.

A daemon document is a plain-text file published by its owner and split into
sections by header lines such as `[ABOUT]` or `[TELOS]`. daemon_mcp exposes
those sections to agents as MCP tools over JSON-RPC 2.0 on a single HTTP
endpoint.

# Overview

Every request is handled from scratch: the envelope is validated, the document
is fetched from its upstream URL, parsed into sections, and the requested tool
is answered from that parse. Nothing is cached between requests, so edits to
the document show up on the next call.

Like the rest of the server, the transport uses threads rather than an async
runtime: one accept thread and one worker thread per connection.

# Tools

| tool | answers with |
|---|---|
| `get_about` … `get_projects` | the body of one fixed section, or `<SECTION> section not available` |
| `get_all` | every known facet as one JSON object, plus `last_updated` |
| `get_section` | any section by name, case-insensitive |

The full catalog is [`mcp::tools::CATALOG`].

# Quick Start

```no_run
use daemon_mcp::{Service, config::Config, http::Server, source::HttpSource};

let config = Config::from_env().unwrap();
let service = Service::new(HttpSource::new(config.source_url));
let server = Server::new(config.listen_addr, service).unwrap();
println!("listening on {}", server.local_addr());
std::thread::park();
```

## Embedding without a network

Any [`source::DocumentSource`] can back the service. [`source::StaticSource`]
serves a fixed body:

```
use daemon_mcp::{Service, http::HttpRequest, source::StaticSource};

let service = Service::new(StaticSource::new("[MISSION]\nShip small things."));
let call = r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_section","arguments":{"section":"mission"}},"id":"m"}"#;
let response = service.handle(&HttpRequest::new("POST", call));

let reply: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
assert_eq!(reply["id"], "m");
assert_eq!(reply["result"]["content"][0]["text"], "Ship small things.");
```

# Logging

Lifecycle and request outcomes are logged with `logwise`. Document contents
are never logged.
*/

pub mod config;
pub mod cors;
pub mod http;
pub mod jrpc;
pub mod mcp;
pub mod sections;
pub mod service;
pub mod source;
pub mod validate;

pub use service::Service;
