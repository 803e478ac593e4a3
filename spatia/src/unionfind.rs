//! A weighted, path-compressing disjoint-set structure with ordered
//! cluster enumeration, sized once at creation.

/// Disjoint sets over the indices `0..n`.
///
/// Invariants after any sequence of [`union`](UnionFind::union) calls:
/// every member of a cluster finds the same root; a root's size slot
/// holds the cluster cardinality and a non-root's holds zero;
/// [`num_clusters`](UnionFind::num_clusters) equals the number of
/// non-zero size slots.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parents: Vec<u32>,
    sizes: Vec<u32>,
    num_clusters: u32,
}

impl UnionFind {
    pub fn new(n: u32) -> UnionFind {
        UnionFind {
            parents: (0..n).collect(),
            sizes: vec![1; n as usize],
            num_clusters: n,
        }
    }

    /// The capacity the structure was created with.
    pub fn len(&self) -> u32 {
        self.parents.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn num_clusters(&self) -> u32 {
        self.num_clusters
    }

    /// The root of `i`'s cluster, compressing the visited path to point
    /// directly at the root.
    pub fn find(&mut self, i: u32) -> u32 {
        let mut root = i;
        while self.parents[root as usize] != root {
            root = self.parents[root as usize];
        }
        let mut cur = i;
        while cur != root {
            let next = self.parents[cur as usize];
            self.parents[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Cardinality of `i`'s cluster.
    pub fn size(&mut self, i: u32) -> u32 {
        let root = self.find(i);
        self.sizes[root as usize]
    }

    /// Merge the clusters of `i` and `j`, weighted by size; on a size tie
    /// the larger root index joins the smaller.
    pub fn union(&mut self, i: u32, j: u32) {
        let a = self.find(i);
        let b = self.find(j);
        if a == b {
            return;
        }
        let (child, parent) = if self.sizes[a as usize] < self.sizes[b as usize]
            || (self.sizes[a as usize] == self.sizes[b as usize] && a > b)
        {
            (a, b)
        } else {
            (b, a)
        };
        self.parents[child as usize] = parent;
        self.sizes[parent as usize] += self.sizes[child as usize];
        self.sizes[child as usize] = 0;
        self.num_clusters -= 1;
    }

    /// A permutation of `0..n` in which members of the same cluster are
    /// contiguous: indices ordered by (root, index).
    pub fn ordered_by_cluster(&mut self) -> Vec<u32> {
        for i in 0..self.len() {
            self.find(i);
        }
        let mut order: Vec<u32> = (0..self.len()).collect();
        order.sort_by_key(|&i| (self.parents[i as usize], i));
        order
    }

    /// Sequential 0-based cluster ids for the elements passing `mask`
    /// (all elements when `mask` is `None`), indexed by original
    /// position; masked-out elements get `None`.
    pub fn collapsed_cluster_ids(&mut self, mask: Option<&[bool]>) -> Vec<Option<u32>> {
        let order = self.ordered_by_cluster();
        let mut ids = vec![None; self.len() as usize];
        let mut next_id = 0;
        let mut last_root = None;
        for &j in &order {
            if let Some(mask) = mask {
                if !mask[j as usize] {
                    continue;
                }
            }
            let root = self.find(j);
            let id = match last_root {
                Some(last) if last == root => next_id,
                Some(_) => {
                    next_id += 1;
                    next_id
                }
                None => next_id,
            };
            last_root = Some(root);
            ids[j as usize] = Some(id);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_initializes_singletons() {
        let mut uf = UnionFind::new(10);
        assert_eq!(uf.len(), 10);
        assert_eq!(uf.num_clusters(), 10);
        assert_eq!(uf.parents, (0..10).collect::<Vec<u32>>());
        assert_eq!(uf.sizes, vec![1; 10]);
        for i in 0..10 {
            assert_eq!(uf.find(i), i);
            assert_eq!(uf.size(i), 1);
        }
    }

    #[test]
    fn union_weights_and_tie_breaks() {
        let mut uf = UnionFind::new(10);

        uf.union(0, 7); // both have size 1, so 7 joins 0
        uf.union(3, 2); // both have size 1, so 3 joins 2
        uf.union(8, 7); // 8 (smaller) joins the 0-7 cluster
        uf.union(1, 2); // 1 (smaller) joins the 2-3 cluster

        assert_eq!(uf.parents, vec![0, 2, 2, 2, 4, 5, 6, 0, 0, 9]);
        assert_eq!(uf.sizes, vec![3, 0, 3, 0, 1, 1, 1, 0, 0, 1]);
        assert_eq!(uf.num_clusters(), 6);
        assert_eq!(uf.size(8), 3);
        assert_eq!(uf.find(3), uf.find(1));
    }

    #[test]
    fn union_is_idempotent() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 0);
        uf.union(0, 1);
        assert_eq!(uf.num_clusters(), 3);
        assert_eq!(uf.size(1), 2);
    }

    #[test]
    fn root_size_equals_membership_count() {
        let mut uf = UnionFind::new(32);
        for i in 0..16 {
            uf.union(i, i + 16);
        }
        uf.union(0, 5);
        uf.union(5, 9);
        for i in 0..32 {
            let root = uf.find(i);
            let members = (0..32).filter(|&j| uf.find(j) == root).count() as u32;
            assert_eq!(uf.size(i), members);
        }
        let total: u32 = uf.sizes.iter().sum();
        assert_eq!(total, 32);
        assert_eq!(
            uf.sizes.iter().filter(|&&s| s > 0).count() as u32,
            uf.num_clusters()
        );
    }

    #[test]
    fn ordered_by_cluster_groups_members() {
        let mut uf = UnionFind { parents: vec![0, 2, 2, 2, 4, 5, 6, 0, 0, 2], sizes: vec![3, 0, 4, 0, 1, 1, 1, 0, 0, 0], num_clusters: 5 };
        let order = uf.ordered_by_cluster();
        assert_eq!(order.len(), 10);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<u32>>());

        let mut seen = [false; 10];
        for (i, &id) in order.iter().enumerate() {
            let root = uf.find(id) as usize;
            if seen[root] {
                // A revisited cluster must continue the current run.
                let prev_root = uf.find(order[i - 1]) as usize;
                assert_eq!(root, prev_root);
            }
            seen[root] = true;
        }
    }

    #[test]
    fn ordered_by_cluster_is_sorted_by_root_then_index() {
        let mut uf = UnionFind::new(5);
        uf.union(1, 3);
        uf.union(4, 0);
        // roots: 0 -> {0, 4}, 1 -> {1, 3}, 2 -> {2}
        assert_eq!(uf.ordered_by_cluster(), vec![0, 4, 1, 3, 2]);
    }

    #[test]
    fn collapsed_ids_are_sequential() {
        let mut uf = UnionFind::new(6);
        uf.union(0, 2);
        uf.union(3, 5);
        let ids = uf.collapsed_cluster_ids(None);
        assert_eq!(ids, vec![Some(0), Some(1), Some(0), Some(2), Some(3), Some(2)]);
    }

    #[test]
    fn collapsed_ids_skip_masked_elements() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(3, 4);
        let mask = [true, true, false, true, true];
        let ids = uf.collapsed_cluster_ids(Some(&mask));
        assert_eq!(ids, vec![Some(0), Some(0), None, Some(1), Some(1)]);
    }

    #[test]
    fn weighted_union_keeps_paths_logarithmic() {
        // Binary merge schedule: the worst case for tree height under
        // weighting. Raw parent-chain depth must stay within log2(n)+1.
        let n: u32 = 1024;
        let mut uf = UnionFind::new(n);
        let mut stride = 1;
        while stride < n {
            let mut i = 0;
            while i + stride < n {
                uf.union(i, i + stride);
                i += stride * 2;
            }
            stride *= 2;
        }
        assert_eq!(uf.num_clusters(), 1);
        let max_depth = (0..n)
            .map(|i| {
                let mut depth = 0;
                let mut cur = i;
                while uf.parents[cur as usize] != cur {
                    cur = uf.parents[cur as usize];
                    depth += 1;
                }
                depth
            })
            .max()
            .unwrap();
        assert!(max_depth <= 11, "path depth {max_depth} exceeds log bound");
    }
}
