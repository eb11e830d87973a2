//! Connected-component labeling for binary masks
//!
//! Two-pass labeling with a disjoint-set forest over provisional labels.
//! Labels start at 1, background is 0, and final labels are numbered in the
//! raster order in which each component is first met.

/// Pixel neighbourhood used to decide whether two foreground pixels touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours only.
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    #[default]
    Eight,
}

/// Label image produced by [`label_regions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<u32>,
    height: usize,
    width: usize,
    num_regions: usize,
}

/// One connected foreground region of a [`LabelMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Label of the region, starting at 1.
    pub label: u32,
    /// Flat row-major indices of the pixels that belong to the region.
    pub pixels: Vec<usize>,
}

impl Region {
    /// Number of pixels in the region.
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    /// Number of region pixels that are set in `flags`.
    ///
    /// `flags` must be laid out like the mask the region was labeled from.
    pub fn intensity_sum(&self, flags: &[bool]) -> usize {
        self.pixels.iter().filter(|&&p| flags[p]).count()
    }

    /// Fraction of the region covered by `flags`.
    pub fn overlap(&self, flags: &[bool]) -> f64 {
        self.intensity_sum(flags) as f64 / self.area() as f64
    }
}

impl LabelMap {
    /// Per-pixel labels, row-major, 0 for background.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Number of labeled regions.
    pub const fn num_regions(&self) -> usize {
        self.num_regions
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    /// Label at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.labels[row * self.width + col]
    }

    /// Collect the pixels of every region, ordered by label.
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = (1..=self.num_regions as u32)
            .map(|label| Region {
                label,
                pixels: Vec::new(),
            })
            .collect();

        for (idx, &label) in self.labels.iter().enumerate() {
            if label > 0 {
                regions[label as usize - 1].pixels.push(idx);
            }
        }

        regions
    }
}

struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new() -> Self {
        // Slot 0 is the background and never joins a set.
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut i: u32) -> u32 {
        let mut root = i;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        while self.parent[i as usize] != root {
            let next = self.parent[i as usize];
            self.parent[i as usize] = root;
            i = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// Label the connected foreground components of a row-major `height × width` mask.
///
/// # Panics
/// Panics if `mask.len() != height * width`.
pub fn label_regions(
    mask: &[bool],
    height: usize,
    width: usize,
    connectivity: Connectivity,
) -> LabelMap {
    assert_eq!(
        mask.len(),
        height * width,
        "mask length does not match {height}x{width}"
    );

    let mut provisional = vec![0_u32; mask.len()];
    let mut sets = DisjointSet::new();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if !mask[idx] {
                continue;
            }

            let mut neighbours = [0_u32; 4];
            let mut n = 0;
            let mut push = |r: usize, c: usize| {
                let label = provisional[r * width + c];
                if label > 0 {
                    neighbours[n] = label;
                    n += 1;
                }
            };

            if col > 0 {
                push(row, col - 1);
            }
            if row > 0 {
                push(row - 1, col);
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        push(row - 1, col - 1);
                    }
                    if col + 1 < width {
                        push(row - 1, col + 1);
                    }
                }
            }

            provisional[idx] = match neighbours[..n].iter().copied().min() {
                None => sets.make_set(),
                Some(first) => {
                    for &other in &neighbours[..n] {
                        sets.union(first, other);
                    }
                    first
                }
            };
        }
    }

    // Second pass: resolve roots and renumber them in first-seen order.
    let mut final_label = vec![0_u32; sets.parent.len()];
    let mut num_regions = 0_u32;
    let labels = provisional
        .into_iter()
        .map(|label| {
            if label == 0 {
                return 0;
            }
            let root = sets.find(label) as usize;
            if final_label[root] == 0 {
                num_regions += 1;
                final_label[root] = num_regions;
            }
            final_label[root]
        })
        .collect();

    LabelMap {
        labels,
        height,
        width,
        num_regions: num_regions as usize,
    }
}
