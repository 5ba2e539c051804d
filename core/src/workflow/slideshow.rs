/// Cycling index over the placeholder gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slideshow {
    index: usize,
    len: usize,
    playing: bool,
}

impl Slideshow {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            playing: false,
        }
    }

    /// Adopts a freshly loaded gallery size.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }

    pub fn start(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.index = 0;
    }

    /// Advances one frame while playing; returns the new index.
    pub fn tick(&mut self) -> Option<usize> {
        if !self.playing || self.len == 0 {
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}
