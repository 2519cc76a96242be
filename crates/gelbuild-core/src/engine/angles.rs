use super::config::{AngleRule, HydrogelAngleParams};
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::ids::AtomId;
use crate::core::models::system::World;
use crate::core::models::topology::AngleParams;
use itertools::Itertools;
use tracing::debug;

/// Enumerates every `side1 - center - side2` triple of the bond graph.
///
/// Centers are atoms with at least two bonds, visited in id order; the two sides of each
/// triple are an unordered pair of the center's neighbors with `side1 < side2`.
pub fn angle_triples(world: &World) -> Vec<[AtomId; 3]> {
    world
        .atoms_iter()
        .filter(|(_, atom)| atom.number_of_bonds() >= 2)
        .flat_map(|(center, atom)| {
            atom.bonded_atoms()
                .iter()
                .copied()
                .sorted()
                .tuple_combinations()
                .map(move |(a, b)| [a, center, b])
        })
        .collect()
}

/// Replaces the registry's angles with one angle per triple, parameterized by `classify`.
///
/// Returns the number of angles created.
pub fn build_angles<F>(world: &mut World, classify: F) -> usize
where
    F: Fn(&Atom, &Atom, &Atom) -> AngleParams,
{
    world.clear_angles();
    let triples = angle_triples(world);
    for [side1, center, side2] in triples {
        let params = {
            let atoms = world.atoms();
            classify(
                &atoms[side1.index()],
                &atoms[center.index()],
                &atoms[side2.index()],
            )
        };
        world.add_angle(side1, center, side2, params);
    }
    debug!(angles = world.angles().len(), "Built angles.");
    world.angles().len()
}

/// Role-based angle parameters of a hydrogel triple.
pub fn classify_hydrogel(
    params: &HydrogelAngleParams,
    side1: &Atom,
    center: &Atom,
    side2: &Atom,
) -> AngleParams {
    let is_backbone = |atom: &Atom| atom.role == AtomRole::Backbone;
    let backbone_sides = [side1, side2].into_iter().filter(|a| is_backbone(a)).count();
    match (is_backbone(center), backbone_sides) {
        (true, 2) => params.backbone_straight,
        (true, 1) => params.backbone_branch,
        (false, _) => params.side_straight,
        _ => params.default,
    }
}

/// Type-based angle parameters of a polymer triple: the first rule sharing a bead type with
/// the triple wins.
pub fn classify_polymer(
    rules: &[AngleRule],
    default: AngleParams,
    side1: &Atom,
    center: &Atom,
    side2: &Atom,
) -> AngleParams {
    rules
        .iter()
        .find(|rule| {
            rule.matches(
                [side1, center, side2]
                    .into_iter()
                    .map(|atom| atom.bead_type.as_str()),
            )
        })
        .map_or(default, |rule| rule.params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomTemplate;
    use crate::core::models::topology::BondParams;
    use nalgebra::Point3;

    fn add(world: &mut World, role: AtomRole, bead_type: &str) -> AtomId {
        let template = AtomTemplate {
            role,
            bead_type: bead_type.to_string(),
            ..AtomTemplate::default()
        };
        world.add_atom(Atom::from_template(&template, Point3::origin()))
    }

    /// Backbone b0-b1-b2 with a side chain s0-s1 on b1 and a crosslinker x on b2.
    fn branched_world() -> World {
        let mut world = World::new(0.24);
        let b0 = add(&mut world, AtomRole::Backbone, "C1");
        let b1 = add(&mut world, AtomRole::Backbone, "C1");
        let b2 = add(&mut world, AtomRole::Backbone, "C1");
        let s0 = add(&mut world, AtomRole::Sidechain, "P5");
        let s1 = add(&mut world, AtomRole::Sidechain, "Nda");
        let x = add(&mut world, AtomRole::Crosslinker, "C1");
        for (a, b) in [(b0, b1), (b1, b2), (b1, s0), (s0, s1), (b2, x)] {
            world.add_bond(a, b, BondParams::default());
        }
        world
    }

    #[test]
    fn triples_enumerate_every_neighbor_pair() {
        let world = branched_world();
        let triples = angle_triples(&world);
        // b1 has three neighbors (3 pairs), b2 and s0 have two each.
        assert_eq!(triples.len(), 5);
        for [a, _, b] in &triples {
            assert!(a < b);
        }
    }

    #[test]
    fn hydrogel_classification_follows_roles() {
        let mut world = branched_world();
        let params = HydrogelAngleParams::default();
        let count = build_angles(&mut world, |a, c, b| classify_hydrogel(&params, a, c, b));
        assert_eq!(count, 5);

        let lookup = |s1: usize, c: usize, s2: usize| {
            world
                .angles()
                .iter()
                .find(|angle| angle.atoms() == [AtomId::new(s1), AtomId::new(c), AtomId::new(s2)])
                .map(|angle| angle.params)
                .unwrap()
        };
        assert_eq!(lookup(0, 1, 2), params.backbone_straight);
        assert_eq!(lookup(0, 1, 3), params.backbone_branch);
        assert_eq!(lookup(1, 2, 5), params.backbone_branch);
        assert_eq!(lookup(1, 3, 4), params.side_straight);
    }

    #[test]
    fn backbone_center_without_backbone_sides_uses_default() {
        let mut world = World::new(0.24);
        let c = add(&mut world, AtomRole::Backbone, "C1");
        let s = add(&mut world, AtomRole::Sidechain, "P5");
        let x = add(&mut world, AtomRole::Crosslinker, "C1");
        world.add_bond(c, s, BondParams::default());
        world.add_bond(c, x, BondParams::default());
        let params = HydrogelAngleParams::default();
        build_angles(&mut world, |a, c, b| classify_hydrogel(&params, a, c, b));
        assert_eq!(world.angles()[0].params, params.default);
    }

    #[test]
    fn polymer_rules_apply_first_match_then_default() {
        let mut world = branched_world();
        let rules = vec![
            AngleRule::new(["Nda"], AngleParams::new(2, 120.0, 25.0)),
            AngleRule::new(["P5"], AngleParams::new(2, 100.0, 10.0)),
        ];
        let default = AngleParams::default();
        build_angles(&mut world, |a, c, b| classify_polymer(&rules, default, a, c, b));

        let by_center = |c: usize| -> Vec<AngleParams> {
            world
                .angles()
                .iter()
                .filter(|angle| angle.center == AtomId::new(c))
                .map(|angle| angle.params)
                .collect()
        };
        assert_eq!(by_center(3), vec![rules[0].params]);
        assert_eq!(by_center(2), vec![default]);
        assert!(by_center(1).contains(&rules[1].params));
    }

    #[test]
    fn rebuilding_replaces_previous_angles() {
        let mut world = branched_world();
        let params = HydrogelAngleParams::default();
        build_angles(&mut world, |a, c, b| classify_hydrogel(&params, a, c, b));
        let count = build_angles(&mut world, |a, c, b| classify_hydrogel(&params, a, c, b));
        assert_eq!(count, 5);
        assert_eq!(world.atoms()[1].number_of_angles(), 5);
    }
}
