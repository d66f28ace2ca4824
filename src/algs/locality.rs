//! Does this rank own any site of a given iolet?

use crate::lattice::{IoletKind, LatticeSites};

/// `true` iff at least one locally owned site is on iolet `iolet` of `kind`.
///
/// Scans owned sites in order and stops at the first match.
pub fn is_iolet_on_this_rank<L>(kind: IoletKind, lattice: &L, iolet: usize) -> bool
where
    L: LatticeSites + ?Sized,
{
    (0..lattice.local_fluid_site_count()).any(|i| lattice.site(i).is_on_iolet(kind, iolet))
}
