// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Kalamari Intercept CLI
//!
//! Drives the interception engine against the in-memory transport and
//! exposes the wire codec.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use serde_json::{json, Value};

use kalamari_intercept::network::memory::{
    MemoryContextRegistry, MemoryListener, MemoryRequest, MemoryResponse,
};
use kalamari_intercept::{
    is_valid_header_value, is_valid_http_token, BytesValue, EventKind, NetworkConfig,
    NetworkEvent, NetworkModule, NetworkNotification, ProtocolModule,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kalamari_intercept=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "demo" => run_demo().await,
        "check-token" => {
            if args.len() < 3 {
                eprintln!("Usage: kalamari-intercept check-token <value>");
                return ExitCode::from(1);
            }
            check_token(&args[2])
        }
        "decode" => {
            if args.len() < 3 {
                eprintln!("Usage: kalamari-intercept decode <json>");
                return ExitCode::from(1);
            }
            decode_bytes_value(&args[2])
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("kalamari-intercept {}", kalamari_intercept::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Kalamari Intercept - Network Interception Engine

USAGE:
    kalamari-intercept <COMMAND> [ARGS]

COMMANDS:
    demo                Run a scripted interception session in memory
    check-token <s>     Check whether a string is a valid HTTP token / header value
    decode <json>       Decode a BytesValue, e.g. '{{"type":"base64","value":"YWJj"}}'
    help                Show this help message
    version             Show version information

EXAMPLES:
    kalamari-intercept demo
    kalamari-intercept check-token "GE T"
    kalamari-intercept decode '{{"type":"base64","value":"YWJj"}}'

Set RUST_LOG=kalamari_intercept=debug to follow blocked exchanges.
"#
    );
}

fn check_token(value: &str) -> ExitCode {
    let token = is_valid_http_token(value);
    let header_value = is_valid_header_value(value);
    println!("HTTP token:   {}", if token { "valid" } else { "invalid" });
    println!("Header value: {}", if header_value { "valid" } else { "invalid" });

    if token {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn decode_bytes_value(input: &str) -> ExitCode {
    let value: BytesValue = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid BytesValue: {}", e);
            return ExitCode::from(1);
        }
    };

    match value.decode() {
        Ok(bytes) => {
            println!("{} bytes", bytes.len());
            println!("{}", String::from_utf8_lossy(&bytes));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to decode: {}", e);
            ExitCode::from(1)
        }
    }
}

async fn run_demo() -> ExitCode {
    let contexts = Arc::new(MemoryContextRegistry::new());
    contexts.add_top_level("tab-1");
    let network = NetworkModule::with_config(
        NetworkConfig::default(),
        contexts.clone(),
        Arc::new(MemoryListener::new()),
    );

    network.on_event(Arc::new(|event: &NetworkEvent| match serde_json::to_string_pretty(event) {
        Ok(json) => println!("\n=== Event ===\n{}", json),
        Err(e) => eprintln!("Failed to serialize event: {}", e),
    }));

    if let Err(e) = network.subscribe(&EventKind::ALL, None) {
        eprintln!("Failed to subscribe: {}", e);
        return ExitCode::from(1);
    }

    let steps: Vec<(&str, Value)> = vec![
        (
            "network.addIntercept",
            json!({
                "phases": ["beforeRequestSent"],
                "urlPatterns": [{"type": "pattern", "pathname": "/login"}]
            }),
        ),
        (
            "network.addIntercept",
            json!({
                "phases": ["responseStarted"],
                "urlPatterns": [{"type": "string", "pattern": "https://example.com/api/*"}]
            }),
        ),
    ];
    for (method, params) in steps {
        if !run_command(&network, method, params).await {
            return ExitCode::from(1);
        }
    }

    // Blocked: matches /login
    let login = Arc::new(
        MemoryRequest::get("1", "https://example.com/login")
            .context("tab-1")
            .header("Cookie", "session=expired"),
    );
    network.process(NetworkNotification::before_request_sent(login.clone()));

    // Not blocked
    let home = Arc::new(MemoryRequest::get("2", "https://example.com/home").context("tab-1"));
    network.process(NetworkNotification::before_request_sent(home));

    if !run_command(
        &network,
        "network.continueRequest",
        json!({
            "request": "1",
            "method": "POST",
            "cookies": [{"name": "session", "value": {"type": "string", "value": "fresh"}}],
            "body": {"type": "string", "value": "user=demo"}
        }),
    )
    .await
    {
        return ExitCode::from(1);
    }

    // Blocked again at responseStarted
    let api = Arc::new(MemoryRequest::get("3", "https://example.com/api/users").context("tab-1"));
    let response = Arc::new(
        MemoryResponse::new("https://example.com/api/users", 200)
            .header("Content-Type", "application/json")
            .header("Content-Length", "2"),
    );
    network.process(NetworkNotification::response_started(api.clone(), response.clone()));

    if !run_command(
        &network,
        "network.continueResponse",
        json!({
            "request": "3",
            "statusCode": 418,
            "reasonPhrase": "I'm a teapot",
            "headers": [
                {"name": "Content-Length", "value": {"type": "string", "value": "0"}},
                {"name": "X-Intercepted", "value": {"type": "string", "value": "yes"}}
            ]
        }),
    )
    .await
    {
        return ExitCode::from(1);
    }

    network.process(NetworkNotification::response_completed(api, response));

    // Second continuation of the same exchange fails
    run_command(&network, "network.continueRequest", json!({"request": "1"})).await;

    println!("\n=== Summary ===");
    println!("Login request method: {}", login.method_now());
    println!("Login request headers: {:?}", login.headers_now());
    println!("Blocked exchanges left: {}", network.blocked_requests().len());

    ExitCode::SUCCESS
}

async fn run_command(network: &NetworkModule, method: &str, params: Value) -> bool {
    println!("\n>>> {} {}", method, params);
    match network.handle_command(method, params).await {
        Ok(result) => {
            println!("<<< {}", result);
            true
        }
        Err(e) => {
            let response = e.to_response();
            println!("<<< error: {} ({})", response.error, response.message);
            false
        }
    }
}
