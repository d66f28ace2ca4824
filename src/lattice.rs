//! Read-only view of the lattice sites owned by this rank.
//!
//! Only the two per-site facts the boundary coordinator needs are exposed:
//! the site type and, for iolet sites, which iolet the site belongs to.

use serde::{Deserialize, Serialize};

/// Classification of a fluid site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// Bulk fluid or wall-adjacent site.
    Inner,
    Inlet,
    Outlet,
}

/// Category of boundary surface handled by one `BoundaryValues`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoletKind {
    Inlet,
    Outlet,
}

impl IoletKind {
    /// Site type that marks a site of this iolet kind.
    pub fn site_type(self) -> SiteType {
        match self {
            IoletKind::Inlet => SiteType::Inlet,
            IoletKind::Outlet => SiteType::Outlet,
        }
    }
}

/// One locally owned site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub site_type: SiteType,
    /// Iolet index within its kind; `None` for inner sites.
    pub iolet_id: Option<usize>,
}

impl Site {
    pub fn inner() -> Self {
        Self {
            site_type: SiteType::Inner,
            iolet_id: None,
        }
    }

    pub fn iolet(kind: IoletKind, iolet: usize) -> Self {
        Self {
            site_type: kind.site_type(),
            iolet_id: Some(iolet),
        }
    }

    /// `true` if this site belongs to iolet `iolet` of kind `kind`.
    pub fn is_on_iolet(&self, kind: IoletKind, iolet: usize) -> bool {
        self.site_type == kind.site_type() && self.iolet_id == Some(iolet)
    }
}

/// Lattice storage as seen by the boundary coordinator.
pub trait LatticeSites {
    /// Number of fluid sites owned by this rank.
    fn local_fluid_site_count(&self) -> usize;
    /// Site `index` in `0..local_fluid_site_count()`.
    fn site(&self, index: usize) -> Site;
}

/// Plain vector of owned sites.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryLattice {
    sites: Vec<Site>,
}

impl InMemoryLattice {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    /// `inner` bulk sites followed by one site per `(kind, iolet)` pair.
    pub fn with_iolets(inner: usize, iolets: &[(IoletKind, usize)]) -> Self {
        let sites = std::iter::repeat_n(Site::inner(), inner)
            .chain(iolets.iter().map(|&(kind, id)| Site::iolet(kind, id)))
            .collect();
        Self { sites }
    }

    pub fn push(&mut self, site: Site) {
        self.sites.push(site);
    }
}

impl LatticeSites for InMemoryLattice {
    fn local_fluid_site_count(&self) -> usize {
        self.sites.len()
    }

    fn site(&self, index: usize) -> Site {
        self.sites[index]
    }
}
