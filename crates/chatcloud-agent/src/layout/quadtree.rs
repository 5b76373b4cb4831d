use chatcloud_core::Rect;
use smallvec::SmallVec;

const DEFAULT_CAPACITY: usize = 8;
const DEFAULT_MAX_DEPTH: usize = 8;

/// Region quadtree of placed boxes. Each box lives in the deepest node whose
/// bounds fully contain it; boxes straddling a split line stay in the parent.
#[derive(Debug)]
pub struct QuadTree {
    root: QuadNode,
    capacity: usize,
    max_depth: usize,
}

#[derive(Debug)]
struct QuadNode {
    bounds: Rect,
    items: SmallVec<[Rect; DEFAULT_CAPACITY]>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadTree {
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH)
    }

    pub fn with_limits(bounds: Rect, capacity: usize, max_depth: usize) -> Self {
        Self {
            root: QuadNode::new(bounds),
            capacity: capacity.max(1),
            max_depth,
        }
    }

    pub fn insert(&mut self, rect: Rect) {
        self.root.insert(rect, 0, self.capacity, self.max_depth);
    }

    pub fn intersects_any(&self, rect: &Rect) -> bool {
        self.root.intersects_any(rect)
    }
}

impl QuadNode {
    fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            items: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, rect: Rect, depth: usize, capacity: usize, max_depth: usize) {
        if let Some(children) = self.children.as_mut() {
            match children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                Some(child) => child.insert(rect, depth + 1, capacity, max_depth),
                None => self.items.push(rect),
            }
            return;
        }
        self.items.push(rect);
        if self.items.len() > capacity && depth < max_depth {
            self.split();
        }
    }

    fn split(&mut self) {
        let Rect { x0, y0, x1, y1 } = self.bounds;
        let mx = (x0 + x1) / 2.0;
        let my = (y0 + y1) / 2.0;
        let mut children = Box::new([
            QuadNode::new(Rect { x0, y0, x1: mx, y1: my }),
            QuadNode::new(Rect { x0: mx, y0, x1, y1: my }),
            QuadNode::new(Rect { x0, y0: my, x1: mx, y1 }),
            QuadNode::new(Rect { x0: mx, y0: my, x1, y1 }),
        ]);
        for rect in std::mem::take(&mut self.items) {
            match children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                Some(child) => child.items.push(rect),
                None => self.items.push(rect),
            }
        }
        self.children = Some(children);
    }

    fn intersects_any(&self, rect: &Rect) -> bool {
        if self.items.iter().any(|item| item.intersects(rect)) {
            return true;
        }
        match &self.children {
            Some(children) => children
                .iter()
                .any(|c| c.bounds.intersects(rect) && c.intersects_any(rect)),
            None => false,
        }
    }
}
