//! Collection: live registry state -> samples grouped by family.

use serde::Serialize;

use crate::metric::{MetricKind, Sample};
use crate::registry::RegisteredFamily;

/// All samples of one family plus the metadata for its HELP/TYPE lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<Sample>,
}

/// Single-pass iterator returned by [`crate::Registry::collect`].
///
/// Holds the family list captured at call time; a family's children are read
/// only when `next` reaches it, so families registered afterwards are not
/// seen and the sequence cannot be restarted.
pub struct Collect {
    families: std::vec::IntoIter<RegisteredFamily>,
}

impl Collect {
    pub(crate) fn new(families: Vec<RegisteredFamily>) -> Self {
        Self {
            families: families.into_iter(),
        }
    }

    /// Flatten into bare samples, dropping family metadata.
    pub fn samples(self) -> impl Iterator<Item = Sample> {
        self.flat_map(|family| family.samples)
    }
}

impl Iterator for Collect {
    type Item = FamilySnapshot;

    fn next(&mut self) -> Option<FamilySnapshot> {
        self.families.next().map(|f| f.snapshot())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.families.size_hint()
    }
}

impl ExactSizeIterator for Collect {}
