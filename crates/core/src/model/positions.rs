/// Membership flags for session positions `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionSet {
    flags: Vec<bool>,
    count: usize,
}

impl PositionSet {
    /// An empty set sized for a session of `len` questions.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            flags: vec![false; len],
            count: 0,
        }
    }

    /// Insert `position`. Returns false if it was already present or out of range.
    pub fn insert(&mut self, position: usize) -> bool {
        match self.flags.get_mut(position) {
            Some(flag) if !*flag => {
                *flag = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.flags.get(position).copied().unwrap_or(false)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(position, &flag)| flag.then_some(position))
    }

    #[cfg(test)]
    pub(crate) fn force_count(&mut self, count: usize) {
        self.count = count;
    }
}
