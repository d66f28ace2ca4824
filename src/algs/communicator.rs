//! Thin façade over intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! All handles are **waitable** but non-blocking; the boundary channel calls
//! `.wait()` before it trusts that a buffer is ready.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};

use crate::algs::wire::{WireFlag, cast_slice, decode_one};
use crate::iolet_error::IoletError;

/// Tag reserved for membership gathers.
pub const GATHER_TAG: u16 = 0xFA11;

/// Non-blocking communication interface (minimal by design).
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This process's rank.
    fn rank(&self) -> usize;
    /// Number of ranks in the run.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive; `buf.len()` is the expected message length.
    ///
    /// Backends that can see the whole message hand it back unchanged, so
    /// the caller's length check catches a peer that sent too much.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// `true` for the serial no-op backend.
    fn is_no_comm(&self) -> bool {
        false
    }

    /// Collective gather of one flag per rank into `root`.
    ///
    /// Every rank must call this the same number of times, in the same order.
    /// `root` receives `Some(flags)` indexed by rank; every other rank gets
    /// `None`. The default goes through `isend`/`irecv` on [`GATHER_TAG`].
    fn gather_flags(&self, root: usize, flag: bool) -> Result<Option<Vec<bool>>, IoletError> {
        let me = self.rank();
        let size = self.size();
        if root >= size {
            return Err(IoletError::InvalidCoordinator {
                coordinator: root,
                size,
            });
        }

        let wire = [WireFlag::new(flag)];
        if me != root {
            self.isend(root, GATHER_TAG, cast_slice(&wire)).wait();
            return Ok(None);
        }

        let mut pending = Vec::with_capacity(size.saturating_sub(1));
        for peer in (0..size).filter(|&r| r != root) {
            let mut buf = [0u8; std::mem::size_of::<WireFlag>()];
            pending.push((peer, self.irecv(peer, GATHER_TAG, &mut buf)));
        }

        let mut flags = vec![false; size];
        flags[root] = flag;
        for (peer, h) in pending {
            let data = h
                .wait()
                .ok_or_else(|| IoletError::comm(peer, "no membership flag received"))?;
            flags[peer] = decode_one::<WireFlag>(&data)?.get();
        }
        Ok(Some(flags))
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Compile-time no-op comm for pure serial runs: a single rank.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- ThreadComm: intra-process, one thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)

/// FIFO mailboxes shared by every rank of one [`ThreadComm::world`].
#[derive(Debug, Default)]
struct Mailbox {
    slots: DashMap<Key, VecDeque<Bytes>>,
    lock: Mutex<()>,
    arrived: Condvar,
}

impl Mailbox {
    fn post(&self, key: Key, data: Bytes) {
        self.slots.entry(key).or_default().push_back(data);
        let _guard = self.lock.lock();
        self.arrived.notify_all();
    }

    fn try_take(&self, key: &Key) -> Option<Bytes> {
        self.slots.get_mut(key).and_then(|mut queue| queue.pop_front())
    }

    fn take_blocking(&self, key: &Key) -> Bytes {
        let mut guard = self.lock.lock();
        loop {
            if let Some(bytes) = self.try_take(key) {
                return bytes;
            }
            self.arrived.wait(&mut guard);
        }
    }
}

/// Pending receive on a [`ThreadComm`].
#[derive(Debug)]
pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        Some(self.mailbox.take_blocking(&self.key).to_vec())
    }
}

/// In-process communicator: every rank is a thread sharing one mailbox.
///
/// Sends complete immediately; receives block in `wait` until the matching
/// message arrives. Messages with the same (src, dst, tag) are delivered in
/// send order.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl ThreadComm {
    /// One communicator per rank, all wired to a fresh shared mailbox.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        self.mailbox
            .post((self.rank, peer, tag), Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, IoletError, Wait};
    use mpi::environment::Universe;
    use mpi::request::{Request, StaticScope};
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination as _, Root as _, Source as _};

    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialise MPI. Returns `None` if MPI was already initialised.
        pub fn new() -> Option<Self> {
            let universe = mpi::initialize()?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Some(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// Outstanding MPI request over a heap buffer it owns until completion.
    pub struct MpiHandle {
        request: Option<Request<'static, [u8], StaticScope>>,
        buf: *mut [u8],
        is_recv: bool,
    }

    impl MpiHandle {
        fn complete(&mut self) -> Option<Vec<u8>> {
            let request = self.request.take()?;
            request.wait();
            // SAFETY: `buf` came from `Box::leak` in `isend`/`irecv` and the
            // only request borrowing it has just completed.
            let owned = unsafe { Box::from_raw(self.buf) };
            self.is_recv.then(|| owned.to_vec())
        }
    }

    impl Wait for MpiHandle {
        fn wait(mut self) -> Option<Vec<u8>> {
            self.complete()
        }
    }

    impl Drop for MpiHandle {
        fn drop(&mut self) {
            self.complete();
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            let ptr: *mut [u8] = Box::leak(buf.to_vec().into_boxed_slice());
            // SAFETY: freed only in `MpiHandle::complete`, after the request.
            let data: &'static [u8] = unsafe { &*ptr };
            let request = self
                .world
                .process_at_rank(peer as i32)
                .immediate_send_with_tag(StaticScope, data, tag as i32);
            MpiHandle {
                request: Some(request),
                buf: ptr,
                is_recv: false,
            }
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let ptr: *mut [u8] = Box::leak(vec![0u8; buf.len()].into_boxed_slice());
            // SAFETY: freed only in `MpiHandle::complete`, after the request.
            let data: &'static mut [u8] = unsafe { &mut *ptr };
            let request = self
                .world
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, data, tag as i32);
            MpiHandle {
                request: Some(request),
                buf: ptr,
                is_recv: true,
            }
        }

        fn gather_flags(
            &self,
            root: usize,
            flag: bool,
        ) -> Result<Option<Vec<bool>>, IoletError> {
            if root >= self.size {
                return Err(IoletError::InvalidCoordinator {
                    coordinator: root,
                    size: self.size,
                });
            }
            let mine = flag as i32;
            let root_process = self.world.process_at_rank(root as i32);
            if self.rank == root {
                let mut flags = vec![0i32; self.size];
                root_process.gather_into_root(&mine, &mut flags[..]);
                Ok(Some(flags.into_iter().map(|f| f != 0).collect()))
            } else {
                root_process.gather_into(&mine);
                Ok(None)
            }
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::{MpiComm, MpiHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn thread_roundtrip_two_ranks() {
        let mut world = ThreadComm::world(2);
        let comm1 = world.pop().unwrap();
        let comm0 = world.pop().unwrap();

        let mut recv_buf = [0u8; 4];
        let recv_handle = comm1.irecv(0, 7, &mut recv_buf);
        comm0.isend(1, 7, &[1, 2, 3, 4]).wait();

        let data = recv_handle
            .wait()
            .expect("Expected to receive data from rank 0");
        recv_buf.copy_from_slice(&data);
        assert_eq!(&recv_buf, &[1, 2, 3, 4]);
    }

    #[test]
    fn same_key_messages_arrive_in_send_order() {
        let world = ThreadComm::world(2);
        world[0].isend(1, 3, &[10]);
        world[0].isend(1, 3, &[20]);
        let mut buf = [0u8; 1];
        let first = world[1].irecv(0, 3, &mut buf).wait().unwrap();
        let second = world[1].irecv(0, 3, &mut buf).wait().unwrap();
        assert_eq!((first[0], second[0]), (10, 20));
    }

    #[test]
    fn receive_blocks_until_sender_posts() {
        let world = ThreadComm::world(2);
        let receiver = world[1].clone();
        let t = thread::spawn(move || {
            let mut buf = [0u8; 2];
            receiver.irecv(0, 11, &mut buf).wait()
        });
        thread::sleep(std::time::Duration::from_millis(20));
        world[0].isend(1, 11, &[5, 6]);
        assert_eq!(t.join().unwrap(), Some(vec![5, 6]));
    }

    #[test]
    fn oversized_message_is_delivered_whole() {
        let world = ThreadComm::world(2);
        world[0].isend(1, 9, &[1, 2, 3, 4, 5, 6]);
        let mut buf = [0u8; 4];
        assert_eq!(
            world[1].irecv(0, 9, &mut buf).wait(),
            Some(vec![1, 2, 3, 4, 5, 6])
        );
    }

    #[test]
    fn separate_worlds_do_not_share_mailboxes() {
        let a = ThreadComm::world(2);
        let b = ThreadComm::world(2);
        a[0].isend(1, 1, &[1]);
        b[0].isend(1, 1, &[2]);
        let mut buf = [0u8; 1];
        assert_eq!(b[1].irecv(0, 1, &mut buf).wait(), Some(vec![2]));
        assert_eq!(a[1].irecv(0, 1, &mut buf).wait(), Some(vec![1]));
    }

    #[test]
    fn gather_flags_orders_by_rank() {
        let handles: Vec<_> = ThreadComm::world(4)
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let flag = comm.rank() % 2 == 1;
                    comm.gather_flags(2, flag).unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results[0], None);
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(vec![false, true, false, true]));
        assert_eq!(results[3], None);
    }

    #[test]
    fn no_comm_gathers_its_own_flag() {
        let comm = NoComm;
        assert!(comm.is_no_comm());
        assert_eq!(comm.gather_flags(0, true).unwrap(), Some(vec![true]));
        assert!(matches!(
            comm.gather_flags(1, true),
            Err(IoletError::InvalidCoordinator { coordinator: 1, size: 1 })
        ));
    }
}
