//! K-way merge of sorted change sub-sequences
//!
//! Static album membership comes from the database already ordered by
//! update id; each dynamic album contributes its own ordered run. The
//! merge interleaves them into one ascending sequence, stable by source
//! index on ties.

pub trait Ordered {
    fn sort_key(&self) -> i64;
}

/// Merge ascending runs into one ascending sequence.
///
/// Each input must already be sorted by `sort_key`. Ties keep the
/// earlier source first.
pub fn merge_ascending<T: Ordered>(sources: Vec<Vec<T>>) -> Vec<T> {
    let total: usize = sources.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);

    let mut runs: Vec<std::vec::IntoIter<T>> =
        sources.into_iter().map(Vec::into_iter).collect();
    let mut heads: Vec<Option<T>> = runs.iter_mut().map(Iterator::next).collect();

    loop {
        let mut min: Option<(usize, i64)> = None;
        for (idx, head) in heads.iter().enumerate() {
            if let Some(item) = head {
                let key = item.sort_key();
                if min.map_or(true, |(_, k)| key < k) {
                    min = Some((idx, key));
                }
            }
        }

        let Some((idx, _)) = min else {
            break;
        };
        if let Some(item) = heads[idx].take() {
            out.push(item);
        }
        heads[idx] = runs[idx].next();
    }

    out
}

/// Sorted runs drained incrementally against an advancing bound.
///
/// Lets computed rows ride along a live ascending scan: the scan stays
/// lazy while the buffered runs release everything at or below each
/// scanned key.
pub struct RunBuffer<T: Ordered> {
    merged: std::iter::Peekable<std::vec::IntoIter<T>>,
}

impl<T: Ordered> RunBuffer<T> {
    pub fn new(sources: Vec<Vec<T>>) -> Self {
        Self {
            merged: merge_ascending(sources).into_iter().peekable(),
        }
    }

    /// Buffered items with a sort key at or below `bound`, ascending.
    pub fn take_through(&mut self, bound: i64) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = self.merged.next_if(|i| i.sort_key() <= bound) {
            out.push(item);
        }
        out
    }

    /// Everything left, ascending.
    pub fn drain(&mut self) -> Vec<T> {
        self.merged.by_ref().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(i64, &'static str);

    impl Ordered for Item {
        fn sort_key(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn interleaves_static_and_dynamic_runs() {
        let merged = merge_ascending(vec![
            vec![Item(2, "s"), Item(5, "s"), Item(9, "s")],
            vec![Item(1, "d"), Item(4, "d"), Item(9, "d")],
        ]);
        let keys: Vec<i64> = merged.iter().map(|i| i.0).collect();
        assert_eq!(keys, vec![1, 2, 4, 5, 9, 9]);
        // Ties keep the earlier source first.
        assert_eq!(merged[4].1, "s");
        assert_eq!(merged[5].1, "d");
    }

    #[test]
    fn run_buffer_releases_through_an_advancing_bound() {
        let mut buffer = RunBuffer::new(vec![
            vec![Item(1, "d"), Item(6, "d")],
            vec![Item(4, "e")],
        ]);
        assert_eq!(buffer.take_through(4), vec![Item(1, "d"), Item(4, "e")]);
        assert!(buffer.take_through(4).is_empty());
        assert_eq!(buffer.drain(), vec![Item(6, "d")]);
    }

    #[test]
    fn empty_and_single_sources() {
        assert_eq!(merge_ascending::<Item>(vec![]), vec![]);
        assert_eq!(
            merge_ascending(vec![vec![], vec![Item(3, "d")]]),
            vec![Item(3, "d")]
        );
    }
}
