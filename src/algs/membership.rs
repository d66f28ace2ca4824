//! Collective discovery of which ranks own an iolet.

use crate::algs::communicator::Communicator;
use crate::iolet_error::IoletError;

/// Gather every rank's ownership flag for one iolet into the coordinator.
///
/// Collective: every rank must call this once per iolet, for the same iolets
/// in the same order, or the run deadlocks. The coordinator gets the owning
/// ranks in ascending order; every other rank gets an empty list, since it
/// only ever talks to the fixed coordinator rank.
pub fn gather_membership<C>(
    comm: &C,
    coordinator_rank: usize,
    has_iolet: bool,
) -> Result<Vec<usize>, IoletError>
where
    C: Communicator + ?Sized,
{
    let Some(flags) = comm.gather_flags(coordinator_rank, has_iolet)? else {
        return Ok(Vec::new());
    };
    if flags.len() != comm.size() {
        return Err(IoletError::Wire(format!(
            "gathered {} membership flags for {} ranks",
            flags.len(),
            comm.size()
        )));
    }
    Ok(flags
        .iter()
        .enumerate()
        .filter_map(|(rank, &owns)| owns.then_some(rank))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, ThreadComm};
    use std::thread;

    #[test]
    fn serial_owner_is_its_own_member() {
        assert_eq!(gather_membership(&NoComm, 0, true).unwrap(), vec![0]);
        assert!(gather_membership(&NoComm, 0, false).unwrap().is_empty());
    }

    #[test]
    fn only_coordinator_sees_members() {
        let flags = [true, false, true, false];
        let handles: Vec<_> = ThreadComm::world(4)
            .into_iter()
            .map(|comm| {
                thread::spawn(move || gather_membership(&comm, 0, flags[comm.rank()]).unwrap())
            })
            .collect();
        let lists: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(lists[0], vec![0, 2]);
        assert!(lists[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn successive_gathers_stay_in_order() {
        let per_iolet = [[false, true, true], [true, false, false], [false, false, false]];
        let handles: Vec<_> = ThreadComm::world(3)
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    per_iolet
                        .iter()
                        .map(|flags| gather_membership(&comm, 1, flags[comm.rank()]).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let lists: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(lists[1], vec![vec![1, 2], vec![0], vec![]]);
        assert!(lists[0].iter().chain(&lists[2]).all(Vec::is_empty));
    }
}
