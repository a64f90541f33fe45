/// A recomputed per-domain summary that replaces any earlier one for the same domain.
pub trait Rollup {
	fn domain(&self) -> &str;
}

/// `100 * part / whole`, or zero for an empty whole.
pub fn percentage(part: u64, whole: u64) -> f64 {
	if whole == 0 {
		return 0.0;
	}
	100.0 * part as f64 / whole as f64
}

/// Upserts `fresh` rollups into `existing`, keyed by domain.
///
/// A rollup replaces the first existing entry for its domain, otherwise it is
/// appended. At most one entry per domain is ever added.
pub fn merge<T: Rollup>(existing: &mut Vec<T>, fresh: Vec<T>) {
	for rollup in fresh {
		match existing.iter().position(|e| e.domain() == rollup.domain()) {
			Some(index) => existing[index] = rollup,
			None => existing.push(rollup),
		}
	}
}
