#![allow(dead_code)]
use std::thread;

use iolet_exchange::algs::communicator::ThreadComm;
use iolet_exchange::lattice::{InMemoryLattice, IoletKind};

/// Run `f` once per rank of an `n`-rank [`ThreadComm`] world, one thread per
/// rank, and collect the results in rank order.
pub fn run_ranks<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(ThreadComm) -> T + Send + Sync + Clone + 'static,
{
    let handles: Vec<_> = ThreadComm::world(n)
        .into_iter()
        .map(|comm| {
            let f = f.clone();
            thread::spawn(move || f(comm))
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}

/// Lattice for `rank` owning the iolets whose flag row says so.
///
/// `owners[i][r]` is true if rank `r` owns a site of iolet `i`.
pub fn lattice_for(rank: usize, kind: IoletKind, owners: &[Vec<bool>]) -> InMemoryLattice {
    let owned: Vec<_> = owners
        .iter()
        .enumerate()
        .filter(|(_, row)| row[rank])
        .map(|(i, _)| (kind, i))
        .collect();
    InMemoryLattice::with_iolets(8, &owned)
}
