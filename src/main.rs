//! Demo binary for the campus location core
//!
//! Drives the acquisition and tracking APIs against a scripted mock
//! source: a clean fix near the library, a degraded indoor fix, a total
//! provider failure falling back to the default reference, and a short
//! watch session riding through an error burst.

use std::sync::{Arc, Mutex};

use campus_locator::{
    format_coordinate, format_distance, AcquireOptions, CalibrationEngine, LocationCache,
    LocationTracker, MemoryStore, MockPositionSource, PositionAcquirer, RawFix, ResolvedLocation,
    SystemClock, WatchOptions,
};

fn describe(label: &str, location: &ResolvedLocation) {
    let coords = format_coordinate(location.latitude, location.longitude);
    let state = if location.is_default {
        "default reference".to_string()
    } else if let Some(source) = &location.calibration_source {
        format!("calibrated to {source}")
    } else {
        "raw fix".to_string()
    };
    println!(
        "{label}: {coords} ({state}, accuracy {})",
        format_distance(location.accuracy_m)
    );
    if let Some(reason) = location.fallback_reason {
        println!("  fallback reason: {}", reason.as_str());
    }
}

fn acquirer_for(source: MockPositionSource) -> PositionAcquirer {
    let clock = Arc::new(SystemClock);
    let cache = LocationCache::new(Box::new(MemoryStore::new()), clock.clone());
    PositionAcquirer::new(Box::new(source), cache, CalibrationEngine::campus(), clock)
}

fn now_ms() -> u64 {
    use campus_locator::Clock;
    SystemClock.now_ms()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_locator=debug".into()),
        )
        .init();

    println!("== campus-locator demo ==\n");

    // Scenario 1: a sharp fix right by the library snaps onto it
    let mut source = MockPositionSource::new();
    source.push_fix(RawFix::new(23.029_321, 112.184_895, 20.0, now_ms()));
    let mut acquirer = acquirer_for(source);
    let location = acquirer
        .get_current_position(&AcquireOptions::default())
        .expect("acquisition always resolves");
    describe("clean fix", &location);

    // Scenario 2: a coarse indoor fix near the gymnasium still lands on
    // a building through the nearest-building fallback
    let mut source = MockPositionSource::new();
    source.push_fix(RawFix::new(23.026_200, 112.181_700, 80.0, now_ms()));
    let mut acquirer = acquirer_for(source);
    let location = acquirer
        .get_current_position(&AcquireOptions::default())
        .expect("acquisition always resolves");
    describe("indoor fix", &location);

    // Scenario 3: the provider keeps timing out and the cache is empty,
    // so the caller still gets the campus default reference
    let mut source = MockPositionSource::new();
    source.push_error(3, "timeout");
    source.push_error(3, "timeout");
    source.push_error(3, "timeout");
    let mut acquirer = acquirer_for(source);
    let location = acquirer
        .get_current_position(&AcquireOptions::default())
        .expect("acquisition always resolves");
    describe("total failure", &location);

    // Scenario 4: a watch session validates each update and reports the
    // provider error without dropping the session
    println!("\n== watch session ==");
    let clock = Arc::new(SystemClock);
    let mut source = MockPositionSource::new();
    source.push_stream_fix(RawFix::new(23.029_250, 112.185_010, 18.0, now_ms()));
    source.push_stream_error(2, "brief dropout");
    source.push_stream_fix(RawFix::new(23.029_280, 112.185_040, 22.0, now_ms()));
    let cache = LocationCache::new(Box::new(MemoryStore::new()), clock.clone());
    let mut tracker = LocationTracker::new(Box::new(source), cache, clock);

    let updates = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&updates);
    tracker
        .start(
            WatchOptions::default(),
            Box::new(move |loc| captured.lock().unwrap().push(loc)),
            Box::new(|err| println!("  watch error: {err}")),
        )
        .expect("mock stream starts");
    tracker.process();
    for location in updates.lock().unwrap().iter() {
        describe("  update", location);
    }
    if let Some(last) = tracker.stop() {
        describe("last good fix", &last);
    }
}
