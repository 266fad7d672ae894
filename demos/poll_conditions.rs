use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wunderground::{Callbacks, Client};

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Configure the key via WUNDERGROUND_API_KEY or a `.wunderground_key` file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let location = std::env::args().nth(1).unwrap_or_else(|| "DE/Berlin".to_string());
    let client = Client::from_env().context("failed to configure weather client")?;

    let callbacks = Arc::new(
        Callbacks::new(AtomicUsize::new(0))
            .on_temperature(|t, updates| {
                updates.fetch_add(1, Ordering::Relaxed);
                println!("[temperature] {:.1} C / {:.1} F", t.celsius, t.fahrenheit);
            })
            .on_condition(|text, _| println!("[condition] {text}"))
            .on_wind(|w, _| {
                println!("[wind] {:.1} km/h from {:.0} deg", w.speed_kph, w.direction_deg)
            })
            .on_pressure(|hpa, _| println!("[pressure] {hpa:.1} hPa"))
            .on_humidity(|pct, _| println!("[humidity] {pct}%")),
    );

    if let Err(e) = client.fetch_and_dispatch(&callbacks, &location) {
        eprintln!("Failed to fetch weather: {e}");
    }

    println!("\n--- Polling every 10 seconds for 30 seconds ---");
    let poll = client
        .start_poll(Arc::clone(&callbacks), &location, Duration::from_secs(10))
        .context("failed to start polling")?;
    std::thread::sleep(Duration::from_secs(30));
    poll.stop().context("polling ended abnormally")?;

    println!(
        "Polling stopped after {} temperature update(s)",
        callbacks.user_data().load(Ordering::Relaxed)
    );
    Ok(())
}
