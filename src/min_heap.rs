/// Ascending priority queue with a stable tie-break.
///
/// Entries are ordered by key; entries with equal keys come out in the order
/// they were inserted. Tree construction depends on this so that the same
/// frequencies always yield the same tree.
#[derive(Debug, Clone)]
pub struct MinHeap<K, V> {
    elements: Vec<Entry<K, V>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    seq: u64,
    value: V,
}

impl<K: Ord, V> Entry<K, V> {
    fn precedes(&self, other: &Self) -> bool {
        (&self.key, self.seq) < (&other.key, other.seq)
    }
}

impl<K, V> MinHeap<K, V> {
    pub fn new() -> Self {
        MinHeap {
            elements: vec![],
            next_seq: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            elements: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

impl<K: Ord, V> MinHeap<K, V> {
    pub fn insert(&mut self, key: K, value: V) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.elements.push(Entry { key, seq, value });
        self.sift_up(self.elements.len() - 1);
    }

    /// Removes the entry with the smallest key, `None` when the heap is empty.
    pub fn extract_min(&mut self) -> Option<(K, V)> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.elements.len() - 1;
        self.elements.swap(0, last);
        let min = self.elements.pop()?;
        self.min_heapify(0);
        Some((min.key, min.value))
    }

    pub fn peek_min(&self) -> Option<(&K, &V)> {
        self.elements.first().map(|e| (&e.key, &e.value))
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size())
            .all(|i| !self.elements[i].precedes(&self.elements[Self::parent(i)]))
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = Self::parent(i);
            if !self.elements[i].precedes(&self.elements[p]) {
                break;
            }
            self.elements.swap(i, p);
            i = p;
        }
    }

    fn min_heapify(&mut self, mut i: usize) {
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;

            if l < self.heap_size() && self.elements[l].precedes(&self.elements[smallest]) {
                smallest = l;
            }
            if r < self.heap_size() && self.elements[r].precedes(&self.elements[smallest]) {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }
}

impl<K, V> Default for MinHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
