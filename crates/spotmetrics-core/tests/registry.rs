//! Create-or-fetch, update and collection behaviour through the public API.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use spotmetrics_core::{
    FamilySnapshot, HistogramOpts, MetricKind, Opts, Registry, SummaryOpts,
};

fn family(registry: &Registry, name: &str) -> FamilySnapshot {
    registry
        .collect()
        .find(|f| f.name == name)
        .expect("family not collected")
}

#[test]
fn same_declaration_returns_same_family() {
    let r = Registry::new();
    let a = r
        .counter(Opts::new("jobs_total").help("Jobs.").labels(&["queue", "state"]))
        .unwrap();
    // Label order does not matter for validation.
    let b = r
        .counter(Opts::new("jobs_total").labels(&["state", "queue"]))
        .unwrap();
    assert!(a.same_family(&b));
    assert_eq!(r.len(), 1);

    // First declaration wins: positional values follow its order.
    b.with_label_values(&["mail", "done"]).unwrap().inc();
    let child = a.with(&[("state", "done"), ("queue", "mail")]).unwrap();
    assert_eq!(child.get(), 1.0);
}

#[test]
fn conflicting_declarations_fail() {
    let r = Registry::new();
    let counter = r.counter(Opts::new("depth").labels(&["queue"])).unwrap();
    counter.with_label_values(&["q1"]).unwrap().inc_by(2.0).unwrap();

    let err = r.gauge(Opts::new("depth").labels(&["queue"])).err().unwrap();
    assert_eq!(err.code().as_str(), "METRIC_REDEFINITION");
    assert!(err.to_string().contains("counter"));

    let err = r.counter(Opts::new("depth").labels(&["topic"])).err().unwrap();
    assert_eq!(err.code().as_str(), "METRIC_REDEFINITION");

    let err = r.counter(Opts::new("depth")).err().unwrap();
    assert_eq!(err.code().as_str(), "METRIC_REDEFINITION");

    // The existing family is untouched.
    let snap = family(&r, "depth");
    assert_eq!(snap.kind, MetricKind::Counter);
    assert_eq!(snap.samples[0].value, 2.0);
}

#[test]
fn invalid_names_are_rejected() {
    let r = Registry::new();
    assert_eq!(
        r.counter(Opts::new("bad-name")).err().unwrap().code().as_str(),
        "INVALID_METRIC"
    );
    assert!(r
        .histogram(HistogramOpts::new("latency").labels(&["le"]))
        .is_err());
    assert!(r.is_empty());
}

#[test]
fn counter_rejects_negative_delta() {
    let r = Registry::new();
    let c = r.counter(Opts::new("bytes_total")).unwrap();
    c.inc_by(1.5).unwrap();
    c.inc().unwrap();
    let err = c.inc_by(-0.5).unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_DELTA");
    assert_eq!(c.get().unwrap(), 2.5);
}

#[test]
fn labeled_handle_requires_labels() {
    let r = Registry::new();
    let c = r.counter(Opts::new("hits_total").labels(&["path"])).unwrap();
    assert_eq!(c.inc().unwrap_err().code().as_str(), "LABEL_ARITY");
    assert_eq!(
        c.with(&[("route", "/")]).err().unwrap().code().as_str(),
        "UNKNOWN_LABEL_NAME"
    );
}

#[test]
fn concurrent_increments_are_not_lost() {
    let r = Arc::new(Registry::new());
    let threads = 8;
    let per_thread = 10_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let r = Arc::clone(&r);
            thread::spawn(move || {
                // Every thread races on family and child creation too.
                let c = r
                    .counter(Opts::new("ops_total").labels(&["kind"]))
                    .unwrap();
                let child = c.with_label_values(&["write"]).unwrap();
                for _ in 0..per_thread {
                    child.inc_by(0.5).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snap = family(&r, "ops_total");
    assert_eq!(snap.samples.len(), 1);
    assert_eq!(snap.samples[0].value, (threads * per_thread) as f64 * 0.5);
}

#[test]
fn gauge_modes() {
    let r = Registry::new();
    let g = r.gauge(Opts::new("in_flight")).unwrap();
    g.inc().unwrap();
    g.inc().unwrap();
    g.dec().unwrap();
    g.add(4.0).unwrap();
    assert_eq!(g.get().unwrap(), 5.0);
    g.set(-3.0).unwrap();
    assert_eq!(g.get().unwrap(), -3.0);

    let fixed = r.gauge_fn(Opts::new("pool_size"), || 16.0).unwrap();
    assert_eq!(fixed.set(1.0).unwrap_err().code().as_str(), "READ_ONLY_GAUGE");
    // Re-declaring through the stored constructor hands back the callback family.
    let again = r.gauge(Opts::new("pool_size")).unwrap();
    assert!(again.same_family(&fixed));
    assert!(again.inc().is_err());

    // A stored gauge cannot be turned into a callback one.
    let err = r.gauge_fn(Opts::new("in_flight"), || 0.0).err().unwrap();
    assert_eq!(err.code().as_str(), "METRIC_REDEFINITION");

    let err = r
        .gauge_fn(Opts::new("per_pool").labels(&["pool"]), || 0.0)
        .err()
        .unwrap();
    assert_eq!(err.code().as_str(), "INVALID_METRIC");
}

#[test]
fn callback_gauge_is_never_cached() {
    let r = Registry::new();
    let depth = Arc::new(AtomicU64::new(3));
    let seen = Arc::clone(&depth);
    r.gauge_fn(Opts::new("queue_depth").help("Depth."), move || {
        seen.load(Ordering::SeqCst) as f64
    })
    .unwrap();

    assert_eq!(family(&r, "queue_depth").samples[0].value, 3.0);
    depth.store(11, Ordering::SeqCst);
    assert_eq!(family(&r, "queue_depth").samples[0].value, 11.0);
}

#[test]
fn labeled_callback_gauges() {
    let r = Registry::new();
    let g = r.gauge(Opts::new("pool_idle").labels(&["pool"])).unwrap();
    g.with_callback(&["db"], || 2.0).unwrap();
    // Idempotent: the first callback stays installed.
    g.with_callback(&["db"], || 99.0).unwrap();
    g.with_label_values(&["cache"]).unwrap().set(5.0).unwrap();
    assert!(g.with_callback(&["cache"], || 1.0).is_err());

    let snap = family(&r, "pool_idle");
    let values: Vec<(Option<&str>, f64)> = snap
        .samples
        .iter()
        .map(|s| (s.label("pool"), s.value))
        .collect();
    assert_eq!(values, vec![(Some("cache"), 5.0), (Some("db"), 2.0)]);
}

#[test]
fn panicking_callback_does_not_abort_scrape() {
    let r = Registry::new();
    r.gauge_fn(Opts::new("a_broken"), || panic!("callback failure"))
        .unwrap();
    r.counter(Opts::new("b_ok_total")).unwrap().inc().unwrap();

    let families: Vec<FamilySnapshot> = r.collect().collect();
    assert_eq!(families.len(), 2);
    assert!(families[0].samples.is_empty());
    assert_eq!(families[1].samples[0].value, 1.0);
}

#[test]
fn histogram_cumulative_buckets() {
    let r = Registry::new();
    let h = r
        .histogram(HistogramOpts::new("req_seconds").buckets(vec![0.1, 1.0, 10.0, f64::INFINITY]))
        .unwrap();
    for v in [0.05, 0.5, 5.0, 50.0] {
        h.observe(v).unwrap();
    }

    let snap = family(&r, "req_seconds");
    let buckets: Vec<(&str, f64)> = snap
        .samples
        .iter()
        .filter(|s| s.name == "req_seconds_bucket")
        .map(|s| (s.label("le").unwrap(), s.value))
        .collect();
    assert_eq!(
        buckets,
        vec![("0.1", 1.0), ("1", 2.0), ("10", 3.0), ("+Inf", 4.0)]
    );

    let sum = snap.samples.iter().find(|s| s.name == "req_seconds_sum").unwrap();
    assert!((sum.value - 55.55).abs() < 1e-9);
    let count = snap.samples.iter().find(|s| s.name == "req_seconds_count").unwrap();
    assert_eq!(count.value, 4.0);
}

#[test]
fn histogram_defaults_and_first_buckets_win() {
    let r = Registry::new();
    let h = r.histogram(HistogramOpts::new("default_seconds")).unwrap();
    let bounds = h.with_label_values(&[]).unwrap().upper_bounds().to_vec();
    assert_eq!(bounds.len(), 12);
    assert_eq!(bounds.last(), Some(&f64::INFINITY));

    let again = r
        .histogram(HistogramOpts::new("default_seconds").buckets(vec![1.0]))
        .unwrap();
    assert!(again.same_family(&h));
    assert_eq!(again.with_label_values(&[]).unwrap().upper_bounds().len(), 12);
}

#[test]
fn histogram_concurrent_observers_stay_consistent() {
    let r = Arc::new(Registry::new());
    let h = r
        .histogram(HistogramOpts::new("work_seconds").buckets(vec![1.0, 2.0]))
        .unwrap();

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let h = h.clone();
            thread::spawn(move || {
                for _ in 0..5_000 {
                    h.observe(i as f64).unwrap();
                }
            })
        })
        .collect();

    // Scrapes racing the writers must always agree on +Inf vs _count.
    for _ in 0..50 {
        let snap = family(&r, "work_seconds");
        let inf = snap
            .samples
            .iter()
            .find(|s| s.label("le") == Some("+Inf"))
            .unwrap()
            .value;
        let count = snap
            .samples
            .iter()
            .find(|s| s.name == "work_seconds_count")
            .unwrap()
            .value;
        assert_eq!(inf, count);
    }
    for w in writers {
        w.join().unwrap();
    }

    let child = h.with_label_values(&[]).unwrap();
    let snap = child.snapshot();
    assert_eq!(snap.count, 20_000);
    assert_eq!(snap.sum, 5_000.0 * (0.0 + 1.0 + 2.0 + 3.0));
    assert_eq!(snap.buckets, vec![(1.0, 10_000), (2.0, 15_000), (f64::INFINITY, 20_000)]);
}

#[test]
fn summary_samples() {
    let r = Registry::new();
    let s = r
        .summary(
            SummaryOpts::new("rpc_seconds")
                .help("RPC latency.")
                .labels(&["service"])
                .objectives(&[(0.5, 0.05), (0.9, 0.01)]),
        )
        .unwrap();
    let child = s.with_label_values(&["auth"]).unwrap();
    for v in 1..=10 {
        child.observe(v as f64);
    }

    let snap = family(&r, "rpc_seconds");
    assert_eq!(snap.kind, MetricKind::Summary);
    let names: Vec<(&str, Option<&str>)> = snap
        .samples
        .iter()
        .map(|s| (s.name.as_str(), s.label("quantile")))
        .collect();
    assert_eq!(
        names,
        vec![
            ("rpc_seconds", Some("0.5")),
            ("rpc_seconds", Some("0.9")),
            ("rpc_seconds_sum", None),
            ("rpc_seconds_count", None),
        ]
    );
    assert!(snap.samples.iter().all(|s| s.label("service") == Some("auth")));
    assert_eq!(snap.samples[2].value, 55.0);
    assert_eq!(snap.samples[3].value, 10.0);
}

#[test]
fn summary_rejects_bad_objectives() {
    let r = Registry::new();
    let err = r
        .summary(SummaryOpts::new("bad").objectives(&[(1.5, 0.01)]))
        .err()
        .unwrap();
    assert_eq!(err.code().as_str(), "INVALID_METRIC");
    assert!(r
        .summary(SummaryOpts::new("bad").max_age(std::time::Duration::ZERO))
        .is_err());
    assert!(r.is_empty());
}

#[test]
fn global_registry_is_shared() {
    let a = Registry::global()
        .counter(Opts::new("global_test_total"))
        .unwrap();
    let b = Registry::global()
        .counter(Opts::new("global_test_total"))
        .unwrap();
    assert!(a.same_family(&b));
}

#[test]
fn collect_is_sorted_and_flattens() {
    let r = Registry::new();
    r.gauge(Opts::new("zeta")).unwrap().set(1.0).unwrap();
    r.counter(Opts::new("alpha_total")).unwrap().inc().unwrap();

    let names: Vec<String> = r.collect().map(|f| f.name).collect();
    assert_eq!(names, vec!["alpha_total", "zeta"]);

    let values: Vec<f64> = r.collect().samples().map(|s| s.value).collect();
    assert_eq!(values, vec![1.0, 1.0]);
}
