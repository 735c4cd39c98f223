use crate::pose::ViewpointPose;

/// Ordered viewpoint list with a navigation cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewpointList {
    poses: Vec<ViewpointPose>,
    cursor: Option<usize>,
}

impl ViewpointList {
    pub fn new(poses: Vec<ViewpointPose>) -> Self {
        Self {
            poses,
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn as_slice(&self) -> &[ViewpointPose] {
        &self.poses
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Replace every pose and clear the cursor.
    pub fn replace(&mut self, poses: Vec<ViewpointPose>) {
        self.poses = poses;
        self.cursor = None;
    }

    /// Insert at `index`, clamped to the end of the list. The cursor keeps
    /// pointing at the same pose.
    pub fn insert(&mut self, index: usize, pose: ViewpointPose) {
        let index = index.min(self.poses.len());
        self.poses.insert(index, pose);
        if let Some(cursor) = self.cursor.filter(|&c| index <= c) {
            self.cursor = Some(cursor + 1);
        }
    }

    /// Remove a batch of indices.
    ///
    /// Out-of-range and repeated indices are ignored. Afterwards the cursor
    /// sits just before the lowest removed slot, wrapping to the last pose,
    /// or is cleared when the list became empty. Returns the removed count.
    pub fn remove(&mut self, indices: &[usize]) -> usize {
        let mut doomed: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.poses.len())
            .collect();
        doomed.sort_unstable();
        doomed.dedup();
        let Some(&lowest) = doomed.first() else {
            return 0;
        };

        for &i in doomed.iter().rev() {
            self.poses.remove(i);
        }

        self.cursor = if self.poses.is_empty() {
            None
        } else if lowest == 0 {
            Some(self.poses.len() - 1)
        } else {
            Some(lowest - 1)
        };
        doomed.len()
    }

    /// Step the cursor forward, wrapping at the end.
    pub fn next(&mut self) -> Option<&ViewpointPose> {
        if self.poses.is_empty() {
            return None;
        }
        let i = match self.cursor {
            Some(i) if i + 1 < self.poses.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.cursor = Some(i);
        self.poses.get(i)
    }

    /// Step the cursor backward, wrapping at the start.
    pub fn previous(&mut self) -> Option<&ViewpointPose> {
        if self.poses.is_empty() {
            return None;
        }
        let last = self.poses.len() - 1;
        let i = match self.cursor {
            Some(0) | None => last,
            Some(i) => (i - 1).min(last),
        };
        self.cursor = Some(i);
        self.poses.get(i)
    }

    pub fn position_of(&self, pose: &ViewpointPose) -> Option<usize> {
        self.poses.iter().position(|p| p == pose)
    }

    /// Move the cursor to `pose` if it is in the list.
    pub fn goto(&mut self, pose: &ViewpointPose) -> Option<&ViewpointPose> {
        let i = self.position_of(pose)?;
        self.cursor = Some(i);
        self.poses.get(i)
    }
}
