use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Tower-compatible middleware that stamps every response with its wall
/// time (`X-Response-Time-Us` and the standard `Server-Timing` header)
/// and prints a coloured one-liner per ingest request.
///
/// Remote-write traffic is the interesting signal here; liveness probes
/// are skipped to keep the console readable under a prober.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let elapsed = started.elapsed();
    let us = elapsed.as_micros();

    if let Ok(val) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }
    let server_timing = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    if path != "/healthz" {
        let status = response.status().as_u16();
        let colour = match status {
            200..=299 => "\x1b[32m", // green
            400..=499 => "\x1b[33m", // yellow: bad payload from the scraper
            _ => "\x1b[31m",         // red: proxy trouble
        };
        println!("  {colour}{status}\x1b[0m  {method:<5} {path:<12} {us:>7}μs");
    }

    response
}
