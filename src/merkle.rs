/// Address-Set Commitment
///
/// Merkle tree over a transaction's source addresses. Leaves are address
/// hashes, deduplicated and sorted ascending so the root does not depend on
/// input order. Internal nodes hash the sorted pair of their children, which
/// makes proofs position-free: a verifier only needs the sibling hashes.
///
/// Levels are built left to right. An unpaired last node is carried up to
/// the next level as-is, so `n` leaves always produce `2n - 1` nodes.

use crate::hashing::{keccak256, standard_address_hash, Bytes32};

/// Hash of two nodes, independent of their order
pub fn common_hash(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_bytes());
    buf[32..].copy_from_slice(hi.as_bytes());
    keccak256(&buf)
}

/// Leaf value for an address; values that already are 32-byte hex hashes pass through
pub fn leaf_hash(value: &str) -> Bytes32 {
    Bytes32::from_hex(value).unwrap_or_else(|| standard_address_hash(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// levels[0] are the sorted leaves, the last level holds the root
    levels: Vec<Vec<Bytes32>>,
}

impl MerkleTree {
    /// Build from raw addresses (or precomputed hashes)
    pub fn from_addresses<S: AsRef<str>>(values: &[S]) -> Self {
        let hashes: Vec<Bytes32> = values.iter().map(|v| leaf_hash(v.as_ref())).collect();
        Self::from_hashes(hashes)
    }

    pub fn from_hashes(mut leaves: Vec<Bytes32>) -> Self {
        leaves.sort();
        leaves.dedup();

        let mut levels = Vec::new();
        if leaves.is_empty() {
            return Self { levels };
        }

        levels.push(leaves);
        while levels.last().map_or(false, |level| level.len() > 1) {
            let current = &levels[levels.len() - 1];
            let next: Vec<Bytes32> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => common_hash(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            levels.push(next);
        }

        Self { levels }
    }

    /// Root of the tree; `None` for an empty address set
    pub fn root(&self) -> Option<Bytes32> {
        self.levels.last().and_then(|level| level.first()).copied()
    }

    /// Number of distinct leaves
    pub fn hash_count(&self) -> usize {
        self.levels.first().map_or(0, |leaves| leaves.len())
    }

    /// Sorted, deduplicated leaves
    pub fn sorted_hashes(&self) -> &[Bytes32] {
        self.levels.first().map_or(&[], |leaves| leaves.as_slice())
    }

    /// Total number of distinct nodes; carried nodes are counted once
    pub fn node_count(&self) -> usize {
        let n = self.hash_count();
        if n == 0 {
            0
        } else {
            2 * n - 1
        }
    }

    /// Leaf hash at position `i` of the sorted leaf set
    pub fn get_hash(&self, i: usize) -> Option<Bytes32> {
        self.sorted_hashes().get(i).copied()
    }

    /// Sibling hashes from leaf `i` up to the root
    pub fn get_proof(&self, i: usize) -> Option<Vec<Bytes32>> {
        if i >= self.hash_count() {
            return None;
        }

        let mut proof = Vec::new();
        let mut index = i;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            index /= 2;
        }
        Some(proof)
    }
}

/// Re-derive the root from `leaf` and `proof` and compare with `root`
///
/// An empty proof only verifies a single-leaf tree, where the leaf is the root.
pub fn verify_proof(leaf: &Bytes32, proof: &[Bytes32], root: &Bytes32) -> bool {
    let derived = proof.iter().fold(*leaf, |acc, sibling| common_hash(&acc, sibling));
    derived == *root
}

/// Hex-string variant of [`verify_proof`]; malformed input verifies as `false`
pub fn verify_with_merkle_proof(leaf: &str, proof: &[String], root: &str) -> bool {
    let leaf = match Bytes32::from_hex(leaf) {
        Some(h) => h,
        None => return false,
    };
    let root = match Bytes32::from_hex(root) {
        Some(h) => h,
        None => return false,
    };
    let mut siblings = Vec::with_capacity(proof.len());
    for item in proof {
        match Bytes32::from_hex(item) {
            Some(h) => siblings.push(h),
            None => return false,
        }
    }
    verify_proof(&leaf, &siblings, &root)
}
