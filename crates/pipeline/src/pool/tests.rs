use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use brewline_core::{ProcessingState, WorkItem};

use crate::config::PipelineSettings;
use crate::pool::{select_fastest_available, WorkerPool};
use crate::queue::Queue;
use crate::strategy::SchedulingStrategy;
use crate::task::{simulated_latency, FnTask, Task};
use crate::worker::{IdleNotifier, Worker, WorkerIo};

const WAIT: Duration = Duration::from_secs(5);
const SETTLE: Duration = Duration::from_millis(200);

fn io() -> WorkerIo {
    WorkerIo {
        input: Queue::bounded(100).unwrap(),
        output: Queue::bounded(100).unwrap(),
    }
}

fn instant_task(throughput: u32) -> Arc<dyn Task> {
    Arc::new(FnTask::new("instant", throughput, |mut item: WorkItem| {
        item.advance(ProcessingState::Stage(1));
        item
    }))
}

/// Task that sleeps `amount / throughput` time units.
fn timed_task(throughput: u32, unit: Duration) -> Arc<dyn Task> {
    Arc::new(FnTask::new("timed", throughput, move |mut item: WorkItem| {
        thread::sleep(simulated_latency(item.amount, throughput, unit));
        item.advance(ProcessingState::Stage(1));
        item
    }))
}

/// Task that reports each start on `started` and waits for one token from `gate`.
fn gated_task(throughput: u32, gate: Receiver<()>, started: Sender<f64>) -> Arc<dyn Task> {
    Arc::new(FnTask::new("gated", throughput, move |mut item: WorkItem| {
        let _ = started.send(item.amount);
        let _ = gate.recv();
        item.advance(ProcessingState::Stage(1));
        item
    }))
}

fn idle_worker(id: &str, throughput: u32) -> Arc<Worker> {
    let worker = Worker::new(
        id,
        io(),
        instant_task(throughput),
        false,
        Arc::new(IdleNotifier::new()),
    )
    .unwrap();
    Arc::new(worker)
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

fn collect(queue: &Queue<WorkItem>, n: usize) -> Vec<WorkItem> {
    (0..n)
        .map(|i| {
            queue
                .pop_timeout(WAIT)
                .unwrap_or_else(|| panic!("timed out waiting for output item {i}"))
        })
        .collect()
}

// ── Validation ──────────────────────────────────────────────────────

#[test]
fn empty_pool_is_invalid() {
    let err = WorkerPool::spawn(
        "empty",
        io(),
        Vec::new(),
        SchedulingStrategy::Pull,
        &PipelineSettings::default(),
    )
    .unwrap_err();
    assert!(err.is_invalid_configuration());
}

#[test]
fn zero_throughput_is_invalid() {
    let err = WorkerPool::validate("p", &[instant_task(4), instant_task(0)]).unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("p[1]"));
}

#[test]
fn invalid_settings_rejected() {
    let settings = PipelineSettings {
        worker_input_capacity: 0,
        ..PipelineSettings::default()
    };
    let err = WorkerPool::spawn(
        "p",
        io(),
        vec![instant_task(1)],
        SchedulingStrategy::PushRoundRobin,
        &settings,
    )
    .unwrap_err();
    assert!(err.is_invalid_configuration());
}

// ── Fastest-available selection ─────────────────────────────────────

#[test]
fn selects_highest_throughput_idle_worker() {
    let workers = vec![
        idle_worker("w0", 5),
        idle_worker("w1", 10),
        idle_worker("w2", 3),
    ];
    assert_eq!(select_fastest_available(&workers), Some(1));

    workers[1].claim();
    assert_eq!(select_fastest_available(&workers), Some(0));

    workers[0].claim();
    assert_eq!(select_fastest_available(&workers), Some(2));

    workers[2].claim();
    assert_eq!(select_fastest_available(&workers), None);
}

#[test]
fn tie_goes_to_lowest_index() {
    let workers = vec![
        idle_worker("w0", 2),
        idle_worker("w1", 8),
        idle_worker("w2", 8),
    ];
    assert_eq!(select_fastest_available(&workers), Some(1));
}

// ── Round-robin ─────────────────────────────────────────────────────

#[test]
fn round_robin_assigns_cyclically() {
    let io = io();
    let pool = WorkerPool::spawn(
        "rr",
        io.clone(),
        vec![instant_task(1), instant_task(50), instant_task(3)],
        SchedulingStrategy::PushRoundRobin,
        &PipelineSettings::default(),
    )
    .unwrap();

    for i in 0..9 {
        io.input.push(WorkItem::new(i as f64)).unwrap();
    }

    for item in collect(&io.output, 9) {
        let i = item.amount as usize;
        let expected = format!("rr[{}]", i % 3);
        assert_eq!(item.last_handler(), Some(expected.as_str()), "item {i}");
    }
    assert!(wait_until(|| pool.processed() == 9));
    assert!(pool.stats().iter().all(|s| s.processed == 3));
}

#[test]
fn round_robin_blocks_on_full_private_queue_instead_of_skipping() {
    let (gate_tx, gate_rx) = unbounded();
    let (started_tx, started_rx) = unbounded();
    let settings = PipelineSettings {
        worker_input_capacity: 1,
        ..PipelineSettings::default()
    };
    let io = io();
    let _pool = WorkerPool::spawn(
        "rr",
        io.clone(),
        vec![gated_task(1, gate_rx, started_tx), instant_task(1)],
        SchedulingStrategy::PushRoundRobin,
        &settings,
    )
    .unwrap();

    // 0 -> w0 (held at the gate), 1 -> w1, 2 -> w0's queue, 3 -> w1,
    // 4 -> w0 blocks the scheduler, 5 waits in the pool input.
    for i in 0..6 {
        io.input.push(WorkItem::new(i as f64)).unwrap();
    }
    assert_eq!(started_rx.recv_timeout(WAIT).unwrap(), 0.0);
    thread::sleep(SETTLE);

    let mut early: Vec<f64> = Vec::new();
    while let Some(item) = io.output.try_pop() {
        early.push(item.amount);
    }
    early.sort_by(f64::total_cmp);
    assert_eq!(early, vec![1.0, 3.0], "idle w1 must not receive item 5 early");
    assert_eq!(io.input.len(), 1);

    for _ in 0..3 {
        gate_tx.send(()).unwrap();
    }
    let mut rest: Vec<(f64, String)> = collect(&io.output, 4)
        .into_iter()
        .map(|item| (item.amount, item.last_handler().unwrap().to_string()))
        .collect();
    rest.sort_by(|a, b| a.0.total_cmp(&b.0));
    assert_eq!(
        rest,
        vec![
            (0.0, "rr[0]".to_string()),
            (2.0, "rr[0]".to_string()),
            (4.0, "rr[0]".to_string()),
            (5.0, "rr[1]".to_string()),
        ]
    );
}

// ── Fastest-available ───────────────────────────────────────────────

#[test]
fn fastest_available_prefers_fast_worker_then_falls_back() {
    let unit = Duration::from_millis(50);
    let io = io();
    let _pool = WorkerPool::spawn(
        "fa",
        io.clone(),
        vec![timed_task(5, unit), timed_task(10, unit)],
        SchedulingStrategy::PushFastestAvailable,
        &PipelineSettings::default(),
    )
    .unwrap();

    let first = WorkItem::new(20.0);
    let second = WorkItem::new(20.0);
    let (first_id, second_id) = (first.id, second.id);

    let start = Instant::now();
    io.input.push(first).unwrap();
    io.input.push(second).unwrap();

    let out = collect(&io.output, 2);
    let by_id: HashMap<_, _> = out.iter().map(|item| (item.id, item)).collect();

    // 20 units at 10/unit = 2 units; the second item arrives while fa[1] is busy.
    assert_eq!(by_id[&first_id].last_handler(), Some("fa[1]"));
    assert_eq!(by_id[&second_id].last_handler(), Some("fa[0]"));
    assert_eq!(out[0].id, first_id, "fast worker finishes first");
    assert!(start.elapsed() >= Duration::from_millis(200), "slow worker needs 4 units");
}

#[test]
fn fastest_available_waits_instead_of_double_booking() {
    let (gate_tx, gate_rx) = unbounded();
    let (started_tx, started_rx) = unbounded();
    let io = io();
    let pool = WorkerPool::spawn(
        "fa",
        io.clone(),
        vec![gated_task(7, gate_rx, started_tx)],
        SchedulingStrategy::PushFastestAvailable,
        &PipelineSettings::default(),
    )
    .unwrap();

    io.input.push(WorkItem::new(1.0)).unwrap();
    io.input.push(WorkItem::new(2.0)).unwrap();
    assert_eq!(started_rx.recv_timeout(WAIT).unwrap(), 1.0);
    thread::sleep(SETTLE);

    let worker = &pool.workers()[0];
    assert_eq!(worker.in_flight(), 1, "busy worker must not be assigned a second item");
    assert_eq!(worker.input().len(), 0);

    gate_tx.send(()).unwrap();
    assert_eq!(started_rx.recv_timeout(WAIT).unwrap(), 2.0);
    gate_tx.send(()).unwrap();

    let amounts: Vec<f64> = collect(&io.output, 2).iter().map(|i| i.amount).collect();
    assert_eq!(amounts, vec![1.0, 2.0]);
}

// ── Busy flag ───────────────────────────────────────────────────────

#[test]
fn busy_from_assignment_until_result_is_pushed() {
    let (gate_tx, gate_rx) = unbounded();
    let (started_tx, started_rx) = unbounded();
    let io = io();
    let pool = WorkerPool::spawn(
        "busy",
        io.clone(),
        vec![gated_task(1, gate_rx, started_tx)],
        SchedulingStrategy::PushFastestAvailable,
        &PipelineSettings::default(),
    )
    .unwrap();
    let worker = Arc::clone(&pool.workers()[0]);
    assert!(!worker.is_busy());

    io.input.push(WorkItem::new(3.0)).unwrap();
    started_rx.recv_timeout(WAIT).unwrap();
    assert!(worker.is_busy());
    assert!(pool.stats()[0].busy);

    gate_tx.send(()).unwrap();
    let out = io.output.pop_timeout(WAIT).unwrap();
    assert_eq!(out.amount, 3.0);
    assert!(wait_until(|| !worker.is_busy()));
    assert_eq!(worker.processed(), 1);
}

#[test]
fn pull_workers_mark_themselves_busy() {
    let (gate_tx, gate_rx) = unbounded();
    let (started_tx, started_rx) = unbounded();
    let io = io();
    let pool = WorkerPool::spawn(
        "pull",
        io.clone(),
        vec![gated_task(1, gate_rx, started_tx)],
        SchedulingStrategy::Pull,
        &PipelineSettings::default(),
    )
    .unwrap();

    io.input.push(WorkItem::new(1.0)).unwrap();
    started_rx.recv_timeout(WAIT).unwrap();
    assert!(pool.workers()[0].is_busy());

    gate_tx.send(()).unwrap();
    io.output.pop_timeout(WAIT).unwrap();
    assert!(wait_until(|| !pool.workers()[0].is_busy()));
}

// ── Pull ────────────────────────────────────────────────────────────

#[test]
fn pull_workers_share_the_pool_input() {
    let io = io();
    let pool = WorkerPool::spawn(
        "pull",
        io.clone(),
        vec![instant_task(1), instant_task(2), instant_task(3)],
        SchedulingStrategy::Pull,
        &PipelineSettings::default(),
    )
    .unwrap();

    assert_eq!(pool.thread_count(), 3, "pull pools run no scheduler thread");
    for worker in pool.workers() {
        assert!(Queue::same_queue(worker.input(), pool.input()));
    }

    let sent: HashSet<_> = (0..30)
        .map(|i| {
            let item = WorkItem::new(i as f64);
            let id = item.id;
            io.input.push(item).unwrap();
            id
        })
        .collect();
    let received: HashSet<_> = collect(&io.output, 30).into_iter().map(|i| i.id).collect();
    assert_eq!(received, sent);
    assert!(io.output.pop_timeout(Duration::from_millis(50)).is_none());
}

#[test]
fn push_pools_give_workers_private_queues() {
    let settings = PipelineSettings {
        worker_input_capacity: 4,
        ..PipelineSettings::default()
    };
    let pool = WorkerPool::spawn(
        "push",
        io(),
        vec![instant_task(1), instant_task(2)],
        SchedulingStrategy::PushRoundRobin,
        &settings,
    )
    .unwrap();

    assert_eq!(pool.thread_count(), 3, "two workers plus the scheduler");
    assert_eq!(pool.strategy(), SchedulingStrategy::PushRoundRobin);
    for worker in pool.workers() {
        assert!(!Queue::same_queue(worker.input(), pool.input()));
        assert_eq!(worker.input().capacity(), 4);
    }
}
