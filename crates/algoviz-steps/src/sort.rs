//! Sorting step machines.
//!
//! All comparisons use `<` / `>` only. Quick sort, merge sort and heapify
//! keep their recursion on explicit frame stacks, so a single `advance`
//! never does more than one comparison's worth of work.

use std::collections::VecDeque;

use crate::catalog::Algorithm;
use crate::error::{Result, StepError};
use crate::event::StepEvent;
use crate::generator::{StepMachine, Steps};

const SORTED: &str = "Array Sorted Successfully!";

fn non_empty(values: Vec<i64>) -> Result<Vec<i64>> {
    if values.is_empty() {
        Err(StepError::EmptyInput)
    } else {
        Ok(values)
    }
}

fn swap(values: &mut [i64], out: &mut VecDeque<StepEvent>, i: usize, j: usize) {
    values.swap(i, j);
    out.push_back(StepEvent::Swap { i, j });
}

/// Bubble sort over all `n - 1` passes, without the early-exit check.
pub fn bubble_sort(values: Vec<i64>) -> Result<Steps<BubbleSort>> {
    Ok(Steps::new(BubbleSort {
        values: non_empty(values)?,
        pass: 0,
        j: 0,
        done: false,
    }))
}

#[derive(Debug, Clone)]
pub struct BubbleSort {
    values: Vec<i64>,
    pass: usize,
    j: usize,
    done: bool,
}

impl StepMachine for BubbleSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BubbleSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        let n = self.values.len();
        if self.pass + 1 >= n {
            out.push_back(StepEvent::message(SORTED));
            self.done = true;
            return true;
        }
        let j = self.j;
        if j + 1 < n - self.pass {
            out.push_back(StepEvent::Compare { i: j, j: j + 1 });
            if self.values[j] > self.values[j + 1] {
                swap(&mut self.values, out, j, j + 1);
            }
            self.j += 1;
        } else {
            self.pass += 1;
            self.j = 0;
        }
        true
    }
}

/// Selection sort: scan for the minimum, then swap it into place.
pub fn selection_sort(values: Vec<i64>) -> Result<Steps<SelectionSort>> {
    Ok(Steps::new(SelectionSort {
        values: non_empty(values)?,
        i: 0,
        j: 1,
        min: 0,
        done: false,
    }))
}

#[derive(Debug, Clone)]
pub struct SelectionSort {
    values: Vec<i64>,
    i: usize,
    j: usize,
    min: usize,
    done: bool,
}

impl StepMachine for SelectionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SelectionSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        let n = self.values.len();
        if self.i + 1 >= n {
            out.push_back(StepEvent::message(SORTED));
            self.done = true;
            return true;
        }
        if self.j == self.i + 1 {
            out.push_back(StepEvent::message(format!(
                "Finding minimum from position {}",
                self.i
            )));
        }
        if self.j < n {
            out.push_back(StepEvent::Compare { i: self.j, j: self.min });
            if self.values[self.j] < self.values[self.min] {
                self.min = self.j;
            }
            self.j += 1;
        } else {
            if self.min != self.i {
                swap(&mut self.values, out, self.i, self.min);
            }
            self.i += 1;
            self.min = self.i;
            self.j = self.i + 1;
        }
        true
    }
}

/// Insertion sort, sinking each key left through adjacent swaps.
pub fn insertion_sort(values: Vec<i64>) -> Result<Steps<InsertionSort>> {
    Ok(Steps::new(InsertionSort {
        values: non_empty(values)?,
        i: 1,
        j: 1,
        done: false,
    }))
}

#[derive(Debug, Clone)]
pub struct InsertionSort {
    values: Vec<i64>,
    i: usize,
    j: usize,
    done: bool,
}

impl InsertionSort {
    fn next_key(&mut self) {
        self.i += 1;
        self.j = self.i;
    }
}

impl StepMachine for InsertionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InsertionSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        if self.i >= self.values.len() {
            out.push_back(StepEvent::message(SORTED));
            self.done = true;
            return true;
        }
        if self.j == self.i {
            out.push_back(StepEvent::message(format!(
                "Inserting Bar {} into the sorted part",
                self.i
            )));
        }
        let j = self.j;
        if j == 0 {
            self.next_key();
            return true;
        }
        out.push_back(StepEvent::Compare { i: j - 1, j });
        if self.values[j - 1] > self.values[j] {
            swap(&mut self.values, out, j - 1, j);
            self.j -= 1;
        } else {
            self.next_key();
        }
        true
    }
}

/// Quick sort with the last element of each range as pivot (Lomuto).
pub fn quick_sort(values: Vec<i64>) -> Result<Steps<QuickSort>> {
    let values = non_empty(values)?;
    let ranges = vec![(0, values.len() - 1)];
    Ok(Steps::new(QuickSort {
        values,
        ranges,
        partition: None,
        done: false,
    }))
}

#[derive(Debug, Clone, Copy)]
struct Partition {
    low: usize,
    high: usize,
    store: usize,
    scan: usize,
}

#[derive(Debug, Clone)]
pub struct QuickSort {
    values: Vec<i64>,
    /// Pending inclusive ranges, the next one on top.
    ranges: Vec<(usize, usize)>,
    partition: Option<Partition>,
    done: bool,
}

impl StepMachine for QuickSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::QuickSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        if let Some(mut p) = self.partition {
            if p.scan < p.high {
                out.push_back(StepEvent::Compare { i: p.scan, j: p.high });
                if self.values[p.scan] < self.values[p.high] {
                    if p.store != p.scan {
                        swap(&mut self.values, out, p.store, p.scan);
                    }
                    p.store += 1;
                }
                p.scan += 1;
                self.partition = Some(p);
            } else {
                out.push_back(StepEvent::message("Placing Pivot at correct position"));
                if p.store != p.high {
                    swap(&mut self.values, out, p.store, p.high);
                }
                let pivot = p.store;
                // Right half goes underneath so the left half runs first.
                if pivot + 1 < p.high {
                    self.ranges.push((pivot + 1, p.high));
                }
                if pivot > p.low + 1 {
                    self.ranges.push((p.low, pivot - 1));
                }
                self.partition = None;
            }
            return true;
        }
        match self.ranges.pop() {
            Some((low, high)) if low < high => {
                out.push_back(StepEvent::message(format!("Choosing Pivot at Bar {high}")));
                self.partition = Some(Partition {
                    low,
                    high,
                    store: low,
                    scan: low,
                });
            }
            Some(_) => {}
            None => {
                out.push_back(StepEvent::message(SORTED));
                self.done = true;
            }
        }
        true
    }
}

/// Top-down merge sort. Each merge compares first, then writes back with `Move`.
pub fn merge_sort(values: Vec<i64>) -> Result<Steps<MergeSort>> {
    let values = non_empty(values)?;
    let frames = vec![MergeFrame::Sort {
        low: 0,
        high: values.len() - 1,
    }];
    Ok(Steps::new(MergeSort {
        values,
        frames,
        merge: None,
        done: false,
    }))
}

#[derive(Debug, Clone, Copy)]
enum MergeFrame {
    Sort { low: usize, high: usize },
    Merge { low: usize, mid: usize, high: usize },
}

#[derive(Debug, Clone)]
struct Merge {
    low: usize,
    mid: usize,
    high: usize,
    left: usize,
    right: usize,
    merged: Vec<i64>,
    written: usize,
}

#[derive(Debug, Clone)]
pub struct MergeSort {
    values: Vec<i64>,
    frames: Vec<MergeFrame>,
    merge: Option<Merge>,
    done: bool,
}

impl MergeSort {
    /// One comparison or one write of the merge in progress.
    fn step_merge(&mut self, out: &mut VecDeque<StepEvent>) {
        let Some(m) = self.merge.as_mut() else {
            return;
        };
        if m.left <= m.mid && m.right <= m.high {
            out.push_back(StepEvent::Compare { i: m.left, j: m.right });
            if self.values[m.right] < self.values[m.left] {
                m.merged.push(self.values[m.right]);
                m.right += 1;
            } else {
                m.merged.push(self.values[m.left]);
                m.left += 1;
            }
            if m.left > m.mid || m.right > m.high {
                // One side ran out: the rest of the other is already in order.
                if m.left <= m.mid {
                    m.merged.extend_from_slice(&self.values[m.left..=m.mid]);
                    m.left = m.mid + 1;
                }
                if m.right <= m.high {
                    m.merged.extend_from_slice(&self.values[m.right..=m.high]);
                    m.right = m.high + 1;
                }
            }
            return;
        }
        if m.written < m.merged.len() {
            let index = m.low + m.written;
            let value = m.merged[m.written];
            self.values[index] = value;
            out.push_back(StepEvent::Move { index, value });
            m.written += 1;
        } else {
            self.merge = None;
        }
    }
}

impl StepMachine for MergeSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::MergeSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        if self.merge.is_some() {
            self.step_merge(out);
            return true;
        }
        match self.frames.pop() {
            Some(MergeFrame::Sort { low, high }) if low < high => {
                let mid = low + (high - low) / 2;
                self.frames.push(MergeFrame::Merge { low, mid, high });
                self.frames.push(MergeFrame::Sort { low: mid + 1, high });
                self.frames.push(MergeFrame::Sort { low, high: mid });
            }
            Some(MergeFrame::Sort { .. }) => {}
            Some(MergeFrame::Merge { low, mid, high }) => {
                out.push_back(StepEvent::message(format!("Merging from {low} to {high}")));
                self.merge = Some(Merge {
                    low,
                    mid,
                    high,
                    left: low,
                    right: mid + 1,
                    merged: Vec::with_capacity(high - low + 1),
                    written: 0,
                });
            }
            None => {
                out.push_back(StepEvent::message(SORTED));
                self.done = true;
            }
        }
        true
    }
}

/// Heap sort: build a max-heap, then repeatedly move the root to the end.
pub fn heap_sort(values: Vec<i64>) -> Result<Steps<HeapSort>> {
    let values = non_empty(values)?;
    let remaining = values.len() / 2;
    Ok(Steps::new(HeapSort {
        values,
        phase: HeapPhase::Build { remaining },
        sift: None,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeapPhase {
    /// Heapify roots `remaining - 1` down to 0.
    Build { remaining: usize },
    /// Move the root behind `end`.
    Extract { end: usize },
    Done,
}

#[derive(Debug, Clone)]
pub struct HeapSort {
    values: Vec<i64>,
    phase: HeapPhase,
    /// Sift-down in progress: current root and heap size.
    sift: Option<(usize, usize)>,
}

impl HeapSort {
    fn sift_level(&mut self, root: usize, size: usize, out: &mut VecDeque<StepEvent>) {
        let mut largest = root;
        let left = 2 * root + 1;
        let right = 2 * root + 2;
        if left < size {
            out.push_back(StepEvent::Compare { i: left, j: largest });
            if self.values[left] > self.values[largest] {
                largest = left;
            }
        }
        if right < size {
            out.push_back(StepEvent::Compare { i: right, j: largest });
            if self.values[right] > self.values[largest] {
                largest = right;
            }
        }
        if largest != root {
            swap(&mut self.values, out, root, largest);
            self.sift = Some((largest, size));
        } else {
            self.sift = None;
        }
    }
}

impl StepMachine for HeapSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HeapSort
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if let Some((root, size)) = self.sift {
            self.sift_level(root, size, out);
            return true;
        }
        let n = self.values.len();
        match self.phase {
            HeapPhase::Build { remaining: 0 } => {
                self.phase = HeapPhase::Extract {
                    end: n.saturating_sub(1),
                };
            }
            HeapPhase::Build { remaining } => {
                let root = remaining - 1;
                out.push_back(StepEvent::message(format!("Heapifying at index {root}")));
                self.sift = Some((root, n));
                self.phase = HeapPhase::Build { remaining: root };
            }
            HeapPhase::Extract { end: 0 } => {
                out.push_back(StepEvent::message(SORTED));
                self.phase = HeapPhase::Done;
            }
            HeapPhase::Extract { end } => {
                swap(&mut self.values, out, 0, end);
                self.sift = Some((0, end));
                self.phase = HeapPhase::Extract { end: end - 1 };
            }
            HeapPhase::Done => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayState;
    use crate::generator::{BoxedGenerator, StepGenerator};
    use proptest::prelude::*;

    const SORTS: [&str; 6] = ["bubble", "selection", "insertion", "quick", "merge", "heap"];

    fn build(name: &str, values: Vec<i64>) -> Result<BoxedGenerator> {
        Ok(match name {
            "bubble" => Box::new(bubble_sort(values)?),
            "selection" => Box::new(selection_sort(values)?),
            "insertion" => Box::new(insertion_sort(values)?),
            "quick" => Box::new(quick_sort(values)?),
            "merge" => Box::new(merge_sort(values)?),
            _ => Box::new(heap_sort(values)?),
        })
    }

    fn replay(values: &[i64], events: &[StepEvent]) -> Vec<i64> {
        let mut state = ArrayState::new(values.to_vec());
        state.replay(events).unwrap();
        state.values().to_vec()
    }

    #[test]
    fn bubble_sort_benchmark_input() {
        let input = vec![5, 1, 4, 2, 8];
        let events: Vec<_> = bubble_sort(input.clone()).unwrap().collect();
        let swaps = events
            .iter()
            .filter(|e| matches!(e, StepEvent::Swap { .. }))
            .count();
        assert_eq!(swaps, 4);

        // Two passes of four and three comparisons already leave it sorted.
        let mut state = ArrayState::new(input);
        let mut compares = 0;
        for event in &events {
            state.apply(event).unwrap();
            if matches!(event, StepEvent::Compare { .. }) {
                compares += 1;
                if compares == 7 {
                    break;
                }
            }
        }
        assert_eq!(state.values(), &[1, 2, 4, 5, 8]);
    }

    #[test]
    fn bubble_sort_runs_every_pass() {
        let compares = bubble_sort(vec![1, 2, 3, 4, 5])
            .unwrap()
            .filter(|e| matches!(e, StepEvent::Compare { .. }))
            .count();
        assert_eq!(compares, 10);
    }

    #[test]
    fn all_sorts_handle_fixed_cases() {
        let cases: [&[i64]; 5] = [&[1], &[2, 1], &[3, 3, 3], &[9, 7, 5, 3, 1], &[4, -2, 7, 0, -2, 9]];
        for name in SORTS {
            for case in cases {
                let events: Vec<_> = build(name, case.to_vec()).unwrap().collect();
                let mut expected = case.to_vec();
                expected.sort();
                assert_eq!(replay(case, &events), expected, "{name} on {case:?}");
                assert_eq!(
                    events.last(),
                    Some(&StepEvent::message(SORTED)),
                    "{name} should announce completion"
                );
            }
        }
    }

    #[test]
    fn empty_input_fails() {
        for name in SORTS {
            assert_eq!(build(name, Vec::new()).err(), Some(StepError::EmptyInput), "{name}");
        }
    }

    #[test]
    fn selection_sort_swaps_at_most_n_minus_one() {
        let swaps = selection_sort(vec![5, 4, 3, 2, 1, 0])
            .unwrap()
            .filter(|e| matches!(e, StepEvent::Swap { .. }))
            .count();
        assert!(swaps <= 5);
    }

    #[test]
    fn merge_sort_writes_with_moves_only() {
        let events: Vec<_> = merge_sort(vec![3, 1, 2]).unwrap().collect();
        assert!(events.iter().all(|e| !matches!(e, StepEvent::Swap { .. })));
        assert!(events.iter().any(|e| matches!(e, StepEvent::Move { .. })));
    }

    #[test]
    fn restart_reproduces_sequence() {
        let mut generator = quick_sort(vec![6, 2, 9, 1, 5]).unwrap();
        let first: Vec<_> = generator.by_ref().collect();
        generator.restart();
        let second: Vec<_> = generator.collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn replay_sorts_any_array(values in prop::collection::vec(-50i64..50, 1..40)) {
            let mut expected = values.clone();
            expected.sort();
            for name in SORTS {
                let events: Vec<_> = build(name, values.clone()).unwrap().collect();
                prop_assert_eq!(replay(&values, &events), expected.clone(), "{}", name);
            }
        }
    }
}
