//! The common interface of digesters, which fold raw shell-quartet integrals into results.

use std::sync::{Mutex, PoisonError};

use anyhow;
use itertools::iproduct;
use ndarray::ArrayView2;

use crate::integrals::two_body::symmetry::QuartetIndex;

/// The basis-function layout of one shell quartet $`(s_1 s_2 | s_3 s_4)`$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellQuartet {
    /// The shell indices.
    pub shells: [usize; 4],

    /// The index of the first basis function of each shell.
    pub offsets: [usize; 4],

    /// The number of functions of each shell.
    pub sizes: [usize; 4],
}

/// A strategy turning shell-quartet integral buffers into a result.
///
/// The two-body evaluator calls [`Self::initialize`] once, then [`Self::digest_quartet`]
/// concurrently from worker threads for every significant quartet, and finally
/// [`Self::finalize`].
pub trait Digester: Sync {
    /// The state mutated while digesting values.
    type Accumulator: Send;

    /// The final result.
    type Output;

    /// Prepares per-thread state for `n_threads` workers.
    fn initialize(&mut self, n_threads: usize);

    /// Whether bra and ket pairs may be exchanged, so that quartets related by
    /// $`(s_1 s_2 | s_3 s_4) = (s_3 s_4 | s_1 s_2)`$ are visited only once when both pairs come
    /// from the same basis set.
    fn bra_ket_symmetric(&self) -> bool;

    /// The multiplicity of a shell quartet in the reduced traversal.
    fn compute_degeneracy(&self, shells: [usize; 4]) -> f64;

    /// Runs `f` on the accumulator of the calling thread.
    fn with_accumulator<F>(&self, f: F)
    where
        F: FnOnce(&mut Self::Accumulator);

    /// Digests one raw integral.
    ///
    /// # Arguments
    ///
    /// * `accumulator` - The accumulator of the calling thread.
    /// * `value` - The raw integral value.
    /// * `index` - The basis-function indices `[i, j, k, l]`.
    /// * `result_index` - The row of the engine buffer: zero for values, or
    ///   `centre * 3 + xyz` for derivatives.
    /// * `degeneracy` - The multiplicity of the shell quartet.
    fn digest(
        &self,
        accumulator: &mut Self::Accumulator,
        value: f64,
        index: QuartetIndex,
        result_index: usize,
        degeneracy: f64,
    );

    /// Digests every nonzero value of a shell-quartet buffer with one row per result.
    fn digest_quartet(&self, buffer: ArrayView2<f64>, quartet: &ShellQuartet) {
        let degeneracy = self.compute_degeneracy(quartet.shells);
        let [o1, o2, o3, o4] = quartet.offsets;
        let [n1, n2, n3, n4] = quartet.sizes;
        self.with_accumulator(|accumulator| {
            for (result_index, row) in buffer.rows().into_iter().enumerate() {
                for ((f1, f2, f3, f4), &value) in
                    iproduct!(0..n1, 0..n2, 0..n3, 0..n4).zip(row.iter())
                {
                    if value == 0.0 {
                        continue;
                    }
                    self.digest(
                        accumulator,
                        value,
                        [o1 + f1, o2 + f2, o3 + f3, o4 + f4],
                        result_index,
                        degeneracy,
                    );
                }
            }
        });
    }

    /// Merges the accumulated state into the result.
    ///
    /// # Errors
    ///
    /// Errors if the per-thread states cannot be merged.
    fn finalize(self) -> Result<Self::Output, anyhow::Error>;
}

/// One accumulator per worker thread, addressed by the rayon thread index.
#[derive(Debug)]
pub(crate) struct PerThread<T> {
    slots: Vec<Mutex<T>>,
}

impl<T> PerThread<T> {
    pub(crate) fn new<F>(n_threads: usize, init: F) -> Self
    where
        F: Fn() -> T,
    {
        Self {
            slots: (0..n_threads.max(1)).map(|_| Mutex::new(init())).collect(),
        }
    }

    pub(crate) fn with<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let i = rayon::current_thread_index().unwrap_or(0) % self.slots.len();
        let mut guard = self.slots[i].lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    pub(crate) fn into_inner(self) -> Vec<T> {
        self.slots
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}
