//! Contract test: fixed-period advertisement scheduling
//!
//! Constraints verified:
//! - The first tick fires immediately on start
//! - Ticks repeat on the refresh interval
//! - A failing tick never cancels future ticks
//! - Ticks are serialized; two are never in flight at once
//!
//! If this test fails, someone has changed the timer to fire lazily,
//! made tick failures propagate, or started spawning ticks concurrently.

mod common;

use common::*;
use homecloud_core::scheduler::Agent;
use std::time::Duration;
use tokio::sync::oneshot;

#[tokio::test]
async fn first_tick_fires_immediately() {
    let (service, _service_probe) = MockTransferService::new();
    let (task, ticks) = CountingTask::new();

    // A long period: any tick observed below must be the immediate one.
    let (agent, _events) = Agent::new(Box::new(service), Box::new(task), &test_config(60))
        .expect("agent construction succeeds");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let agent_handle = tokio::spawn(agent.run_with_shutdown(Some(shutdown_rx)));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(ticks.tick_count(), 1, "exactly the immediate tick ran");

    shutdown_tx.send(()).expect("shutdown signal send succeeds");
    agent_handle
        .await
        .expect("agent task completes")
        .expect("agent shuts down cleanly");
}

#[tokio::test]
async fn ticks_repeat_on_the_refresh_interval() {
    let (service, _service_probe) = MockTransferService::new();
    let (task, ticks) = CountingTask::new();

    let (agent, _events) = Agent::new(Box::new(service), Box::new(task), &test_config(1))
        .expect("agent construction succeeds");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let agent_handle = tokio::spawn(agent.run_with_shutdown(Some(shutdown_rx)));

    // Immediate tick plus at least two periodic ones.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(
        ticks.tick_count() >= 3,
        "expected >= 3 ticks after 2.5 periods, got {}",
        ticks.tick_count()
    );

    shutdown_tx.send(()).expect("shutdown signal send succeeds");
    agent_handle
        .await
        .expect("agent task completes")
        .expect("agent shuts down cleanly");
}

#[tokio::test]
async fn tick_failure_does_not_cancel_future_ticks() {
    let (service, _service_probe) = MockTransferService::new();
    let (task, ticks) = FailingTask::new();

    let (agent, _events) = Agent::new(Box::new(service), Box::new(task), &test_config(1))
        .expect("agent construction succeeds");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let agent_handle = tokio::spawn(agent.run_with_shutdown(Some(shutdown_rx)));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(
        ticks.tick_count() >= 3,
        "the timer kept running through failures, got {} ticks",
        ticks.tick_count()
    );

    shutdown_tx.send(()).expect("shutdown signal send succeeds");
    let result = agent_handle.await.expect("agent task completes");
    assert!(
        result.is_ok(),
        "tick failures never surface from the run: {result:?}"
    );
}

#[tokio::test]
async fn ticks_never_overlap() {
    let (service, _service_probe) = MockTransferService::new();
    // Each tick outlasts the period; a spawning scheduler would overlap.
    let (task, ticks) = CountingTask::slow(Duration::from_millis(1500));

    let (agent, _events) = Agent::new(Box::new(service), Box::new(task), &test_config(1))
        .expect("agent construction succeeds");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let agent_handle = tokio::spawn(agent.run_with_shutdown(Some(shutdown_rx)));

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert!(!ticks.overlapped(), "two ticks were in flight at once");
    assert!(
        ticks.tick_count() >= 2,
        "slow ticks still make progress, got {}",
        ticks.tick_count()
    );

    shutdown_tx.send(()).expect("shutdown signal send succeeds");
    agent_handle
        .await
        .expect("agent task completes")
        .expect("agent shuts down cleanly");
}
