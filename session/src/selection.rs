use connectome_core::SegmentId;

/// Ordered, duplicate-free set of selected segment ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<SegmentId>,
}

impl Selection {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SegmentId>,
    {
        let mut selection = Self::default();
        selection.replace(ids);
        selection
    }

    /// Appends `id` unless it is already selected. Returns whether the set
    /// changed.
    pub fn add(&mut self, id: SegmentId) -> bool {
        if id.is_empty() || self.contains(id.as_str()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Replaces the whole set, keeping first occurrences.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<SegmentId>,
    {
        self.ids.clear();
        for id in ids {
            self.add(id.into());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected.as_str() == id)
    }

    pub fn ids(&self) -> &[SegmentId] {
        &self.ids
    }

    pub fn first(&self) -> Option<&SegmentId> {
        self.ids.first()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Comma-joined ids for the selection banner.
    pub fn display(&self) -> String {
        self.ids
            .iter()
            .map(SegmentId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
