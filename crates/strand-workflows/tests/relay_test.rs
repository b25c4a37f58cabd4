// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Integration tests for the relay workflow.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use strand_runtime::{
    EffectError, EffectGateway, EffectRegistry, Instance, async_trait, spawn_instance,
};
use strand_workflows::{
    RelayParams, RelayWorkflow, Request, Requester, UPPERCASE_OPERATION, worker_registry,
};

/// Spawn a relay instance over the given gateway and threshold.
fn spawn_relay(
    gateway: Arc<dyn EffectGateway>,
    threshold: usize,
) -> Instance<RelayWorkflow> {
    spawn_instance(RelayParams::default(), move |params| {
        RelayWorkflow::with_threshold(params, gateway.clone(), threshold)
    })
}

/// Poll until the response for `id` is committed, panicking after `budget`.
async fn await_response(instance: &Instance<RelayWorkflow>, id: &str, budget: Duration) -> String {
    tokio::time::timeout(budget, async {
        loop {
            let response = instance.current().response(id);
            if !response.is_empty() {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("response was never committed")
}

#[tokio::test(start_paused = true)]
async fn test_enqueued_request_is_transformed_and_committed() {
    let instance = spawn_relay(Arc::new(worker_registry()), 100);

    instance.current().enqueue(Request::new("1", "foo0"));
    let response = await_response(&instance, "1", Duration::from_secs(30)).await;
    assert_eq!(response, "FOO0");

    instance.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_requester_roundtrip() {
    let instance = spawn_relay(Arc::new(worker_registry()), 100);

    let requester = Requester::new(&instance);
    assert_eq!(requester.request_uppercase("foo0").await, "FOO0");
    assert_eq!(requester.request_uppercase("bar1").await, "BAR1");

    instance.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_enqueues_all_answered() {
    let instance = Arc::new(spawn_relay(Arc::new(worker_registry()), 1000));

    let mut senders = Vec::new();
    for i in 0..20 {
        let instance = instance.clone();
        senders.push(tokio::spawn(async move {
            instance
                .current()
                .enqueue(Request::new(format!("req-{i}"), format!("foo{i}")));
        }));
    }
    for sender in senders {
        sender.await.unwrap();
    }

    for i in 0..20 {
        let response =
            await_response(&instance, &format!("req-{i}"), Duration::from_secs(60)).await;
        assert_eq!(response, format!("FOO{i}"));
    }

    instance.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_failed_effect_drops_request_and_loop_continues() {
    let gateway = EffectRegistry::new().register(UPPERCASE_OPERATION, |input| async move {
        if input == "boom" {
            Err(EffectError::Transport {
                operation: UPPERCASE_OPERATION.to_string(),
                message: "worker crashed".to_string(),
            })
        } else {
            Ok(Some(input.to_uppercase()))
        }
    });
    let instance = spawn_relay(Arc::new(gateway), 100);

    instance.current().enqueue(Request::new("bad", "boom"));
    instance.current().enqueue(Request::new("good", "ok"));

    // The failed request is dropped without a table entry; the next request
    // in the same drain cycle still gets processed.
    let response = await_response(&instance, "good", Duration::from_secs(30)).await;
    assert_eq!(response, "OK");
    assert_eq!(instance.current().response("bad"), "");

    instance.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_record_response_overwrites_stale_entry() {
    let wf = RelayWorkflow::new(RelayParams::default(), Arc::new(worker_registry()));
    assert!(wf.record_response("1", "STALE"));
    assert!(wf.record_response("1", "FRESH"));
    assert_eq!(wf.response("1"), "FRESH");
    assert_eq!(wf.response("unknown"), "");
}

#[tokio::test(start_paused = true)]
async fn test_compaction_carries_responses_forward() {
    let mut instance = spawn_relay(Arc::new(worker_registry()), 5);
    assert_eq!(instance.current().generation(), 0);

    for i in 0..5 {
        instance
            .current()
            .enqueue(Request::new(format!("{i}"), format!("foo{i}")));
    }

    // Processing five requests crosses the threshold and triggers
    // continue-as-new.
    assert!(instance.generation_changed().await);
    let fresh = instance.current();
    assert_eq!(fresh.generation(), 1);

    // Every previously committed response is still readable through the
    // logical instance handle, unchanged.
    for i in 0..5 {
        assert_eq!(fresh.response(&format!("{i}")), format!("FOO{i}"));
    }

    // The fresh generation keeps serving new requests.
    fresh.enqueue(Request::new("next", "bar"));
    let response = await_response(&instance, "next", Duration::from_secs(30)).await;
    assert_eq!(response, "BAR");

    instance.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_compaction_waits_for_pending_invocation() {
    struct GatedUppercase {
        gate: Semaphore,
    }

    #[async_trait]
    impl EffectGateway for GatedUppercase {
        async fn invoke(
            &self,
            _operation: &str,
            input: &str,
        ) -> Result<Option<String>, EffectError> {
            let _permit = self.gate.acquire().await.expect("gate semaphore closed");
            Ok(Some(input.to_uppercase()))
        }
    }

    let gateway = Arc::new(GatedUppercase {
        gate: Semaphore::new(0),
    });
    let mut instance = spawn_relay(gateway.clone(), 1);

    instance.current().enqueue(Request::new("1", "foo"));
    tokio::time::sleep(Duration::from_millis(500)).await;

    // The threshold is met, but the invocation is still outstanding:
    // compaction must not fire and the result must not be committed.
    assert_eq!(instance.current().generation(), 0);
    assert_eq!(instance.current().response("1"), "");

    gateway.gate.add_permits(1);
    assert!(instance.generation_changed().await);
    assert_eq!(instance.current().generation(), 1);
    assert_eq!(instance.current().response("1"), "FOO");

    instance.shutdown();
}
