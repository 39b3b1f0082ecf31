#![cfg(not(target_arch = "wasm32"))]

use std::sync::mpsc;
use std::time::{Duration, Instant};

use showroom::flow::LoadRuntime;

#[test]
fn should_run_jobs_off_the_calling_thread() {
    let runtime = LoadRuntime::new().unwrap();
    let caller = std::thread::current().id();
    let (tx, rx) = mpsc::channel();

    runtime.spawn(move || async move {
        tx.send(std::thread::current().id()).unwrap();
    });

    let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(worker, caller);
    runtime.shutdown();
}

#[test]
fn should_not_wait_for_loads_in_flight_on_shutdown() {
    let runtime = LoadRuntime::new().unwrap();
    let (tx, rx) = mpsc::channel();

    runtime.spawn(move || async move {
        tx.send(()).unwrap();
        std::thread::sleep(Duration::from_secs(10));
    });
    rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let start = Instant::now();
    runtime.shutdown();

    assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
}
