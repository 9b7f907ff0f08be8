// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Netscope CLI - HTTP Network Inspection
//!
//! Fetches a URL through the inspector and prints what was recorded.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use netscope::http::headers;
use netscope::{
    HttpClient, HttpClientConfig, InspectorInterceptor, NetworkRecorder, RecorderConfig,
    RequestLogger,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("netscope=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: netscope fetch <url> [--gzip] [--no-bodies]");
                return ExitCode::from(1);
            }
            let options = FetchOptions::parse(&args[3..]);
            match fetch_url(&args[2], options).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Failed to fetch URL: {:#}", e);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("netscope {}", netscope::VERSION);
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
        r#"Netscope - HTTP Network Inspection

USAGE:
    netscope <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL and print the recorded exchange as JSON
    help            Show this help message
    version         Show version information

FETCH OPTIONS:
    --gzip          Ask for a compressed response
    --no-bodies     Record metadata only

EXAMPLES:
    netscope fetch https://example.com
    RUST_LOG=netscope=debug netscope fetch https://example.com --gzip
"#
    );
}

#[derive(Debug, Default)]
struct FetchOptions {
    gzip: bool,
    no_bodies: bool,
}

impl FetchOptions {
    fn parse(args: &[String]) -> Self {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--gzip" => options.gzip = true,
                "--no-bodies" => options.no_bodies = true,
                other => eprintln!("Ignoring unknown option: {}", other),
            }
        }
        options
    }
}

async fn fetch_url(url: &str, options: FetchOptions) -> anyhow::Result<()> {
    let recorder = Arc::new(NetworkRecorder::new(RecorderConfig {
        capture_bodies: !options.no_bodies,
        ..RecorderConfig::default()
    }));

    let client = HttpClient::with_config(HttpClientConfig::default())?
        .interceptor(RequestLogger::default())
        .network_interceptor(InspectorInterceptor::new(recorder.clone()));

    let mut request = client.request(reqwest::Method::GET, url)?;
    if options.gzip {
        request = request.header(headers::ACCEPT_ENCODING, "gzip");
    }

    let response = request.send().await.context("request failed")?;
    let status = response.status;
    let body = response.bytes().await.context("reading response body")?;
    tracing::info!(%status, bytes = body.len(), "Fetched {}", url);

    let json = recorder.to_json().context("serializing events")?;
    println!("{}", json);

    Ok(())
}
