mod util;
use util::*;

use iolet_exchange::prelude::*;
use proptest::prelude::*;

struct Discovered {
    local: Vec<usize>,
    memberships: Vec<Option<Vec<usize>>>,
    total: usize,
}

fn discover(owners: Vec<Vec<bool>>, coordinator: usize, ranks: usize) -> Vec<Discovered> {
    run_ranks(ranks, move |comm| {
        let lattice = lattice_for(comm.rank(), IoletKind::Outlet, &owners);
        let templates: Vec<Iolet> = owners
            .iter()
            .map(|_| CosinePressureIolet::new(80.0, 1.0, 0.0, 0.6).into())
            .collect();
        let bv = BoundaryValues::new(
            IoletKind::Outlet,
            &lattice,
            &templates,
            &UnitConverter::default(),
            &SimulationState::new(10, 1e-4),
            &comm,
            &BoundaryConfig::with_coordinator(coordinator),
        )
        .expect("construction");
        let memberships = (0..bv.total_iolet_count())
            .map(|i| bv.membership(i).unwrap().map(<[usize]>::to_vec))
            .collect();
        Discovered {
            local: bv.local_iolet_ids().to_vec(),
            memberships,
            total: bv.shutdown().unwrap(),
        }
    })
}

#[test]
fn four_ranks_two_iolets() {
    let owners = vec![
        vec![true, false, true, false],
        vec![false, true, false, true],
    ];
    let out = discover(owners, 0, 4);

    assert_eq!(out[0].memberships[0], Some(vec![0, 2]));
    assert_eq!(out[0].memberships[1], Some(vec![1, 3]));
    assert_eq!(out[0].local, vec![0, 1]);
    assert_eq!(out[1].local, vec![1]);
    assert_eq!(out[2].local, vec![0]);
    assert_eq!(out[3].local, vec![1]);

    // non-coordinators hold a channel with an empty list, or no channel
    assert_eq!(out[1].memberships, vec![None, Some(vec![])]);
    assert_eq!(out[2].memberships, vec![Some(vec![]), None]);
    assert!(out.iter().all(|d| d.total == 2));
}

#[test]
fn non_zero_coordinator_is_local_to_every_iolet() {
    let owners = vec![vec![true, false, false], vec![true, false, false]];
    let out = discover(owners, 2, 3);
    assert_eq!(out[2].local, vec![0, 1]);
    assert_eq!(out[2].memberships, vec![Some(vec![0]), Some(vec![0])]);
    assert!(out[1].local.is_empty());
    assert_eq!(out[0].local, vec![0, 1]);
}

#[test]
fn rank_with_no_iolets_constructs_and_releases_everything() {
    let owners = vec![vec![true, false]; 3];
    let out = discover(owners, 0, 2);
    assert!(out[1].local.is_empty());
    assert_eq!(out[1].memberships, vec![None, None, None]);
    assert_eq!(out[1].total, 3);
}

#[test]
fn zero_iolets_is_fine() {
    let out = discover(Vec::new(), 0, 2);
    assert!(out.iter().all(|d| d.local.is_empty() && d.total == 0));
}

fn owner_matrix() -> impl Strategy<Value = (usize, usize, Vec<Vec<bool>>)> {
    (1usize..5, 0usize..5).prop_flat_map(|(ranks, iolets)| {
        (
            Just(ranks),
            0..ranks,
            prop::collection::vec(prop::collection::vec(any::<bool>(), ranks), iolets),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn membership_matches_locality((ranks, coordinator, owners) in owner_matrix()) {
        let out = discover(owners.clone(), coordinator, ranks);
        for (i, row) in owners.iter().enumerate() {
            let expected: Vec<usize> = (0..ranks).filter(|&r| row[r]).collect();
            prop_assert_eq!(out[coordinator].memberships[i].clone(), Some(expected));
        }
        for (rank, d) in out.iter().enumerate() {
            let expected: Vec<usize> = (0..owners.len())
                .filter(|&i| owners[i][rank] || rank == coordinator)
                .collect();
            prop_assert_eq!(&d.local, &expected);
            prop_assert_eq!(d.total, owners.len());
        }
    }
}
