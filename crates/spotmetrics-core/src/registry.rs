//! Metric registry: name -> family.
//!
//! Create-or-fetch is the only registration step. The first caller for a name
//! installs the family; every later caller gets the same family back as long
//! as the metric type and the label-name set agree.

use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::collector::{Collect, FamilySnapshot};
use crate::error::{MetricsError, Result};
use crate::exposition::encode_text;
use crate::family::{Desc, Family};
use crate::metric::histogram::normalize_buckets;
use crate::metric::summary::{validate_objectives, SummaryOptions};
use crate::metric::{
    Counter, Gauge, GaugeCallback, Histogram, Metric, Summary, DEFAULT_BUCKETS,
    DEFAULT_OBJECTIVES,
};
use crate::opts::{HistogramOpts, Opts, SummaryOpts};
use crate::vec::{CounterVec, GaugeVec, HistogramVec, SummaryVec};

/// Closed set of family types held by the registry.
#[derive(Clone)]
pub(crate) enum RegisteredFamily {
    Counter(Arc<Family<Counter>>),
    Gauge(Arc<Family<Gauge>>),
    Histogram(Arc<Family<Histogram>>),
    Summary(Arc<Family<Summary>>),
}

impl RegisteredFamily {
    fn desc(&self) -> &Desc {
        match self {
            RegisteredFamily::Counter(f) => f.desc(),
            RegisteredFamily::Gauge(f) => f.desc(),
            RegisteredFamily::Histogram(f) => f.desc(),
            RegisteredFamily::Summary(f) => f.desc(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.desc().name
    }

    pub(crate) fn snapshot(&self) -> FamilySnapshot {
        let desc = self.desc();
        let samples = match self {
            RegisteredFamily::Counter(f) => f.collect(),
            RegisteredFamily::Gauge(f) => f.collect(),
            RegisteredFamily::Histogram(f) => f.collect(),
            RegisteredFamily::Summary(f) => f.collect(),
        };
        FamilySnapshot {
            name: desc.name.to_string(),
            help: desc.help.clone(),
            kind: desc.kind,
            samples,
        }
    }
}

/// Conversions between a typed family and the registry variant.
trait Registrable: Metric {
    fn wrap(family: Arc<Family<Self>>) -> RegisteredFamily;
    fn downcast(entry: &RegisteredFamily) -> Option<Arc<Family<Self>>>;
}

macro_rules! registrable {
    ($ty:ident) => {
        impl Registrable for $ty {
            fn wrap(family: Arc<Family<Self>>) -> RegisteredFamily {
                RegisteredFamily::$ty(family)
            }

            fn downcast(entry: &RegisteredFamily) -> Option<Arc<Family<Self>>> {
                match entry {
                    RegisteredFamily::$ty(f) => Some(Arc::clone(f)),
                    _ => None,
                }
            }
        }
    };
}

registrable!(Counter);
registrable!(Gauge);
registrable!(Histogram);
registrable!(Summary);

/// Owner of every metric family. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct Registry {
    families: DashMap<String, RegisteredFamily>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use and never torn down.
    /// Prefer passing an explicit registry where tests need isolation.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn counter(&self, opts: Opts) -> Result<CounterVec> {
        self.get_or_create::<Counter>(opts, || Ok(()))
            .map(CounterVec::new)
    }

    pub fn gauge(&self, opts: Opts) -> Result<GaugeVec> {
        self.get_or_create::<Gauge>(opts, || Ok(None)).map(GaugeVec::new)
    }

    /// Unlabeled gauge whose value is `callback()` at every scrape.
    ///
    /// Labeled callback gauges use [`GaugeVec::with_callback`] per tuple.
    pub fn gauge_fn<F>(&self, opts: Opts, callback: F) -> Result<GaugeVec>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        if !opts.label_names.is_empty() {
            return Err(MetricsError::InvalidMetric(format!(
                "callback gauge {} cannot declare labels; use GaugeVec::with_callback",
                opts.name
            )));
        }
        let name = opts.name.clone();
        let cb: GaugeCallback = Arc::new(callback);
        let family = self.get_or_create::<Gauge>(opts, || Ok(Some(cb)))?;
        if !family.unlabeled()?.is_callback() {
            return Err(MetricsError::Redefinition {
                name,
                detail: "already registered as a stored gauge".into(),
            });
        }
        Ok(GaugeVec::new(family))
    }

    /// Histogram with explicit or default buckets. Buckets of later calls for
    /// an existing name are ignored.
    pub fn histogram(&self, opts: HistogramOpts) -> Result<HistogramVec> {
        let HistogramOpts { common, buckets } = opts;
        self.get_or_create::<Histogram>(common, || {
            normalize_buckets(buckets.unwrap_or_else(|| DEFAULT_BUCKETS.to_vec()))
        })
        .map(HistogramVec::new)
    }

    pub fn summary(&self, opts: SummaryOpts) -> Result<SummaryVec> {
        let SummaryOpts {
            common,
            objectives,
            max_age,
        } = opts;
        self.get_or_create::<Summary>(common, || {
            let objectives = objectives.unwrap_or_else(|| DEFAULT_OBJECTIVES.to_vec());
            validate_objectives(&objectives)?;
            if max_age.is_some_and(|age| age.is_zero()) {
                return Err(MetricsError::InvalidMetric("summary max_age must be > 0".into()));
            }
            Ok(SummaryOptions {
                objectives: objectives.into(),
                max_age,
            })
        })
        .map(SummaryVec::new)
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Lazy snapshot of every family, sorted by name.
    ///
    /// Only the family list is copied up front; each family's children are
    /// read when the iterator reaches it.
    pub fn collect(&self) -> Collect {
        let mut families: Vec<RegisteredFamily> =
            self.families.iter().map(|e| e.value().clone()).collect();
        families.sort_by(|a, b| a.name().cmp(b.name()));
        Collect::new(families)
    }

    /// Collect and encode in the text exposition format.
    pub fn render(&self) -> Bytes {
        encode_text(self.collect())
    }

    /// `options` only runs (and can only fail) when this call creates the family.
    fn get_or_create<M: Registrable>(
        &self,
        opts: Opts,
        options: impl FnOnce() -> Result<M::Options>,
    ) -> Result<Arc<Family<M>>> {
        opts.validate(M::KIND)?;

        let existing = self.families.get(&opts.name).map(|e| e.value().clone());
        let entry = match existing {
            Some(entry) => entry,
            None => match self.families.entry(opts.name.clone()) {
                Entry::Occupied(o) => o.get().clone(),
                Entry::Vacant(v) => {
                    let family = Arc::new(Family::<M>::new(
                        Desc {
                            name: Arc::from(opts.name.as_str()),
                            help: opts.help,
                            kind: M::KIND,
                            label_names: opts.label_names,
                        },
                        options()?,
                    ));
                    tracing::debug!(metric = %family.name(), kind = M::KIND.as_str(), "family created");
                    v.insert(M::wrap(Arc::clone(&family)));
                    return Ok(family);
                }
            },
        };

        let Some(family) = M::downcast(&entry) else {
            let existing_kind = entry.desc().kind;
            tracing::warn!(metric = %opts.name, existing = existing_kind.as_str(), requested = M::KIND.as_str(), "metric redefined with another type");
            return Err(MetricsError::Redefinition {
                name: opts.name,
                detail: format!(
                    "registered as {} but requested as {}",
                    existing_kind.as_str(),
                    M::KIND.as_str()
                ),
            });
        };

        if !same_label_set(family.label_names(), &opts.label_names) {
            tracing::warn!(metric = %opts.name, "metric redefined with other label names");
            return Err(MetricsError::Redefinition {
                detail: format!(
                    "label names {:?} conflict with registered {:?}",
                    opts.label_names,
                    family.label_names()
                ),
                name: opts.name,
            });
        }
        Ok(family)
    }
}

/// Order-independent comparison; both sides are known to be duplicate-free.
fn same_label_set(registered: &[String], requested: &[String]) -> bool {
    registered.len() == requested.len() && requested.iter().all(|l| registered.contains(l))
}
