use crate::input::Tap;

use super::layout::{LIST_END_Y, LIST_ITEM_H, LIST_START_Y, LIST_VISIBLE};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListHit {
    Item(usize),
    ScrollUp,
    ScrollDown,
}

/// Six-row window over a longer list with tap-to-scroll zones above and
/// below.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScrollList {
    offset: usize,
    len: usize,
}

impl ScrollList {
    pub const fn new(len: usize) -> Self {
        Self { offset: 0, len }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.offset + LIST_VISIBLE < self.len
    }

    /// Scroll just enough to show `index`.
    pub fn reveal(&mut self, index: usize) {
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + LIST_VISIBLE {
            self.offset = index + 1 - LIST_VISIBLE;
        }
    }

    /// Classify a tap that already missed the header back button. Scroll
    /// zones are only reported when they would move the window.
    pub fn hit(&self, tap: Tap) -> Option<ListHit> {
        if tap.y >= LIST_START_Y && tap.y < LIST_END_Y {
            let index = ((tap.y - LIST_START_Y) / LIST_ITEM_H) as usize + self.offset;
            return (index < self.len).then_some(ListHit::Item(index));
        }
        if tap.y < LIST_START_Y && self.can_scroll_up() {
            return Some(ListHit::ScrollUp);
        }
        if tap.y >= LIST_END_Y && self.can_scroll_down() {
            return Some(ListHit::ScrollDown);
        }
        None
    }

    pub fn scroll(&mut self, hit: ListHit) {
        match hit {
            ListHit::ScrollUp if self.can_scroll_up() => self.offset -= 1,
            ListHit::ScrollDown if self.can_scroll_down() => self.offset += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_through_offset() {
        let mut list = ScrollList::new(10);
        assert_eq!(list.hit(Tap { x: 5, y: 36 }), Some(ListHit::Item(0)));
        assert_eq!(list.hit(Tap { x: 5, y: 32 }), None);
        assert_eq!(list.hit(Tap { x: 5, y: 210 }), Some(ListHit::ScrollDown));
        list.scroll(ListHit::ScrollDown);
        assert_eq!(list.hit(Tap { x: 5, y: 36 + 28 }), Some(ListHit::Item(2)));
        assert_eq!(list.hit(Tap { x: 5, y: 32 }), Some(ListHit::ScrollUp));
    }

    #[test]
    fn rows_past_end_are_ignored() {
        let list = ScrollList::new(2);
        assert_eq!(list.hit(Tap { x: 5, y: 35 + 2 * 28 }), None);
        assert_eq!(list.hit(Tap { x: 5, y: 220 }), None);
    }

    #[test]
    fn reveal_keeps_index_visible() {
        let mut list = ScrollList::new(60);
        list.reveal(20);
        assert_eq!(list.offset(), 15);
        list.reveal(3);
        assert_eq!(list.offset(), 3);
        list.reveal(5);
        assert_eq!(list.offset(), 3);
    }
}
