//! Selection model - which options are chosen, and how picks edit that
//!
//! Options are opaque; they are only ever compared through the caller's
//! key projection, never by reference or structural equality. A caller may
//! therefore rebuild its option values every frame without losing the
//! selection.

/// Whether the control picks one option or a set of options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// Current selection, owned by the caller
///
/// `Multi` keeps keys in the order they were selected and never holds the
/// same key twice. Keys with no matching option are tolerated and simply
/// resolve to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<K> {
    Single(Option<K>),
    Multi(Vec<K>),
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Selection::Single(None)
    }
}

impl<K: PartialEq + Clone> Selection<K> {
    /// Nothing selected, in the shape `mode` expects
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Selection::Single(None),
            SelectionMode::Multi => Selection::Multi(Vec::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Selection::Single(_) => SelectionMode::Single,
            Selection::Multi(_) => SelectionMode::Multi,
        }
    }

    /// Selected keys (selection order for `Multi`)
    pub fn keys(&self) -> &[K] {
        match self {
            Selection::Single(key) => key.as_slice(),
            Selection::Multi(keys) => keys,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Selection after picking `key` in `mode`
    ///
    /// Single mode always switches to exactly `key` (re-picking does not
    /// deselect). Multi mode removes `key` if present and appends it
    /// otherwise, leaving every other key in place. A selection of the other
    /// shape is treated as empty, so the result always has `mode`'s shape.
    pub fn toggled(&self, key: K, mode: SelectionMode) -> Selection<K> {
        match mode {
            SelectionMode::Single => Selection::Single(Some(key)),
            SelectionMode::Multi => {
                let mut keys = match self {
                    Selection::Multi(keys) => keys.clone(),
                    Selection::Single(_) => Vec::new(),
                };
                if let Some(pos) = keys.iter().position(|k| *k == key) {
                    keys.remove(pos);
                } else {
                    keys.push(key);
                }
                Selection::Multi(keys)
            }
        }
    }
}

/// Options matching a selection, in option-set order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    Single(Option<&'a T>),
    Multi(Vec<&'a T>),
}

impl<'a, T> Resolved<'a, T> {
    /// Whether nothing resolved (placeholder should show)
    pub fn is_empty(&self) -> bool {
        match self {
            Resolved::Single(option) => option.is_none(),
            Resolved::Multi(options) => options.is_empty(),
        }
    }
}

/// Map a selection onto the current option set
///
/// `Single` yields the first option whose key matches; duplicate keys are
/// not guarded against. `Multi` yields every match in option-set order,
/// which is the order chips are drawn in.
pub fn resolve_selected<'a, T, K, F>(
    options: &'a [T],
    selection: &Selection<K>,
    key_of: F,
) -> Resolved<'a, T>
where
    K: PartialEq + Clone,
    F: Fn(&T) -> K,
{
    match selection {
        Selection::Single(None) => Resolved::Single(None),
        Selection::Single(Some(key)) => {
            Resolved::Single(options.iter().find(|option| key_of(option) == *key))
        }
        Selection::Multi(keys) => Resolved::Multi(
            options
                .iter()
                .filter(|option| keys.contains(&key_of(option)))
                .collect(),
        ),
    }
}

/// Indices of options whose label contains `text`, ignoring case
///
/// An empty `text` keeps every option.
pub fn filter_options<T, F>(options: &[T], label_of: F, text: &str) -> Vec<usize>
where
    F: Fn(&T) -> String,
{
    let needle = text.to_lowercase();
    options
        .iter()
        .enumerate()
        .filter(|(_, option)| label_of(option).to_lowercase().contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}
