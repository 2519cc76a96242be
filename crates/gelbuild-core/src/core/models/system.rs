use super::atom::{Atom, AtomRole, EndTag};
use super::ids::{AngleId, AtomId, BondId};
use super::topology::{
    Angle, AngleParams, Bond, BondParams, Constraint, Dihedral, Exclusion, NetworkBond,
    canonical_pair,
};
use slotmap::SlotMap;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_MEAN_SEP: f64 = 0.24;

/// The registry holding every entity of one generation run.
///
/// `World` replaces global simulation state: generators receive it by `&mut` reference,
/// and an explicit [`reset`](World::reset) separates independent runs. Atoms live in a dense
/// vector so that ids are gapless; bonds live in a slot map keyed by `BondId` with a pair
/// index enforcing at most one bond per unordered pair.
#[derive(Debug, Clone)]
pub struct World {
    atoms: Vec<Atom>,
    bonds: SlotMap<BondId, Bond>,
    bond_index: HashMap<(AtomId, AtomId), BondId>,
    network_bonds: Vec<NetworkBond>,
    constraints: Vec<Constraint>,
    exclusions: Vec<Exclusion>,
    angles: Vec<Angle>,
    dihedrals: Vec<Dihedral>,
    /// Target distance between consecutive beads, in nm.
    pub mean_sep: f64,
    /// Edge of the cubic periodic box, in nm. Zero disables periodic wrapping.
    pub box_length: f64,
    /// Edge of one diamond unit cell, in nm. Zero outside lattice builds.
    pub ubox_length: f64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(DEFAULT_MEAN_SEP)
    }
}

impl World {
    /// Creates an empty registry with the given mean bead separation.
    pub fn new(mean_sep: f64) -> Self {
        Self {
            atoms: Vec::new(),
            bonds: SlotMap::with_key(),
            bond_index: HashMap::new(),
            network_bonds: Vec::new(),
            constraints: Vec::new(),
            exclusions: Vec::new(),
            angles: Vec::new(),
            dihedrals: Vec::new(),
            mean_sep,
            box_length: 0.0,
            ubox_length: 0.0,
        }
    }

    /// Drops every entity and restores the global scalars to their initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.index())
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// Adjacency is not reachable through this handle; only classification fields and the
    /// position may be changed.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id.index())
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter().map(|atom| (atom.id(), atom))
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms_by_role(&self, role: AtomRole) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms_iter().filter(move |(_, atom)| atom.role == role)
    }

    pub fn atoms_by_end_tag(&self, tag: EndTag) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms_iter().filter(move |(_, atom)| atom.end_tag == tag)
    }

    /// Registers an atom and assigns it the next dense id.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom to register. Any adjacency it carries is discarded.
    ///
    /// # Return
    ///
    /// The id assigned to the atom.
    pub fn add_atom(&mut self, mut atom: Atom) -> AtomId {
        let id = AtomId::new(self.atoms.len());
        atom.detach();
        atom.assign_id(id);
        self.atoms.push(atom);
        id
    }

    /// Adds a bond between two atoms.
    ///
    /// The pair is stored in canonical `(min, max)` order. This method is idempotent;
    /// requesting an existing pair returns the existing bond's id without touching adjacency.
    ///
    /// # Arguments
    ///
    /// * `a` - ID of the first atom.
    /// * `b` - ID of the second atom.
    /// * `params` - Bond parameters for a newly created bond.
    ///
    /// # Return
    ///
    /// Returns `Some(BondId)` if the bond exists afterwards, otherwise `None` (unknown atom or
    /// `a == b`).
    pub fn add_bond(&mut self, a: AtomId, b: AtomId, params: BondParams) -> Option<BondId> {
        if a == b || self.atom(a).is_none() || self.atom(b).is_none() {
            return None;
        }

        let key = canonical_pair(a, b);
        if let Some(&existing) = self.bond_index.get(&key) {
            return Some(existing);
        }

        let bond_id = self.bonds.insert(Bond::new(a, b, params));
        self.bond_index.insert(key, bond_id);
        self.atoms[a.index()].link_bond(b);
        self.atoms[b.index()].link_bond(a);
        Some(bond_id)
    }

    /// Removes the bond between two atoms, mirroring the adjacency update on both endpoints.
    ///
    /// # Return
    ///
    /// Returns the removed `Bond` so that a caller can reinstate it, or `None` if the pair was
    /// not bonded.
    pub fn remove_bond(&mut self, a: AtomId, b: AtomId) -> Option<Bond> {
        let key = canonical_pair(a, b);
        let bond_id = self.bond_index.remove(&key)?;
        let bond = self.bonds.remove(bond_id)?;
        self.atoms[key.0.index()].unlink_bond(key.1);
        self.atoms[key.1.index()].unlink_bond(key.0);
        Some(bond)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    pub fn find_bond(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.bond_index.get(&canonical_pair(a, b)).copied()
    }

    pub fn has_bond(&self, a: AtomId, b: AtomId) -> bool {
        self.bond_index.contains_key(&canonical_pair(a, b))
    }

    pub fn bonds_iter(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds.iter()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Returns the bonded neighbors of an atom, or `None` if the atom does not exist.
    pub fn get_bonded_neighbors(&self, id: AtomId) -> Option<&[AtomId]> {
        self.atom(id).map(Atom::bonded_atoms)
    }

    pub fn add_network_bond(&mut self, bond: NetworkBond) -> Option<usize> {
        let (a, b) = (bond.atom1_id, bond.atom2_id);
        if a == b || self.atom(a).is_none() || self.atom(b).is_none() {
            return None;
        }
        self.atoms[a.index()].link_network_bond(b);
        self.atoms[b.index()].link_network_bond(a);
        self.network_bonds.push(bond);
        Some(self.network_bonds.len() - 1)
    }

    pub fn network_bonds(&self) -> &[NetworkBond] {
        &self.network_bonds
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Option<usize> {
        let (a, b) = (constraint.atom1_id, constraint.atom2_id);
        if a == b || self.atom(a).is_none() || self.atom(b).is_none() {
            return None;
        }
        self.atoms[a.index()].link_constraint(b);
        self.atoms[b.index()].link_constraint(a);
        self.constraints.push(constraint);
        Some(self.constraints.len() - 1)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn add_exclusion(&mut self, exclusion: Exclusion) -> Option<usize> {
        let (a, b) = (exclusion.atom1_id, exclusion.atom2_id);
        if a == b || self.atom(a).is_none() || self.atom(b).is_none() {
            return None;
        }
        self.atoms[a.index()].link_exclusion(b);
        self.atoms[b.index()].link_exclusion(a);
        self.exclusions.push(exclusion);
        Some(self.exclusions.len() - 1)
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Adds the angle `side1 - center - side2` and records it on all three atoms.
    pub fn add_angle(
        &mut self,
        side1: AtomId,
        center: AtomId,
        side2: AtomId,
        params: AngleParams,
    ) -> Option<AngleId> {
        if [side1, center, side2].iter().any(|&id| self.atom(id).is_none()) {
            return None;
        }
        let angle_id = AngleId(self.angles.len());
        self.angles.push(Angle {
            side1,
            center,
            side2,
            params,
        });
        for id in [side1, center, side2] {
            self.atoms[id.index()].link_angle(angle_id);
        }
        Some(angle_id)
    }

    pub fn angle(&self, id: AngleId) -> Option<&Angle> {
        self.angles.get(id.0)
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    /// Drops every angle, leaving the rest of the topology untouched.
    pub fn clear_angles(&mut self) {
        self.angles.clear();
        for atom in &mut self.atoms {
            atom.clear_angles();
        }
    }

    pub fn add_dihedral(&mut self, dihedral: Dihedral) -> Option<usize> {
        if dihedral.atoms.iter().any(|&id| self.atom(id).is_none()) {
            return None;
        }
        self.dihedrals.push(dihedral);
        Some(self.dihedrals.len() - 1)
    }

    pub fn dihedrals(&self) -> &[Dihedral] {
        &self.dihedrals
    }

    /// Returns every atom reachable from `start` over the current bond graph.
    pub fn reachable_from(&self, start: AtomId) -> Vec<bool> {
        let mut visited = vec![false; self.atoms.len()];
        if start.index() >= self.atoms.len() {
            return visited;
        }
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;
        while let Some(current) = queue.pop_front() {
            for &neighbor in self.atoms[current.index()].bonded_atoms() {
                if !visited[neighbor.index()] {
                    visited[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        visited
    }

    /// Counts the atoms reachable from `start` over the current bond graph.
    pub fn closure_size(&self, start: AtomId) -> usize {
        self.reachable_from(start).into_iter().filter(|&v| v).count()
    }

    /// Returns `true` if the bond graph forms a single component spanning every atom.
    pub fn is_connected(&self) -> bool {
        match self.atoms.first() {
            Some(first) => self.closure_size(first.id()) == self.atoms.len(),
            None => true,
        }
    }
}
