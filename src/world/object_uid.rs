/// Hands out unique ids for objects written to the map.
///
/// Multi-part objects (a castle with its basement and flags) share one id:
/// allocate it once, then `rewind_to` that id before writing each extra part.
#[derive(Clone, Debug)]
pub struct ObjectIdAllocator {
    next: u32,
}

impl ObjectIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The most recently allocated id, or 0 if none was handed out yet.
    pub fn last(&self) -> u32 {
        self.next - 1
    }

    /// Make the next `allocate` return `id` again.
    pub fn rewind_to(&mut self, id: u32) {
        debug_assert!(id > 0 && id <= self.next, "cannot rewind forward to {}", id);
        self.next = id;
    }
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewind_reuses_id() {
        let mut uids = ObjectIdAllocator::new();
        assert_eq!(uids.last(), 0);
        let castle = uids.allocate();
        uids.rewind_to(castle);
        assert_eq!(uids.allocate(), castle);
        assert_eq!(uids.allocate(), castle + 1);
        assert_eq!(uids.last(), castle + 1);
    }
}
