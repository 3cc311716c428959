//! Chooser navigation state.
//!
//! The entry list is mirrored into widget rows through the same
//! kind+name reconciliation the compound views use, so a refresh that
//! leaves the listing unchanged keeps every row's identity.

use crate::entries::{DirEntry, read_directory};
use bindui_widget::{
    ChildSpec, ReconcileStats, Widget, WidgetFlags, WidgetKind, reconcile_children,
};
use std::path::{Path, PathBuf};

fn row_spec(entry: &DirEntry) -> ChildSpec {
    // Kind carries the dir/file distinction, so a file replaced by a
    // same-named directory rebuilds its row.
    let kind = if entry.is_dir {
        WidgetKind::Button
    } else {
        WidgetKind::Label
    };
    ChildSpec::new(kind, entry.name.clone())
}

/// Mutable state for the file chooser.
#[derive(Debug)]
pub struct ChooserState {
    /// Current directory being displayed.
    pub current_dir: PathBuf,
    /// Root directory for confinement (navigation never goes above it).
    pub root: Option<PathBuf>,
    /// Directory entries (sorted: dirs first, then files).
    pub entries: Vec<DirEntry>,
    /// Currently highlighted index.
    pub cursor: usize,
    /// The confirmed path (set when the cursor entry is a file and
    /// [`enter`](Self::enter) is called).
    pub selected: Option<PathBuf>,
    rows: Vec<Widget>,
    history: Vec<(PathBuf, usize)>,
}

impl ChooserState {
    /// Create a state over the given directory and entries.
    pub fn new(current_dir: PathBuf, entries: Vec<DirEntry>) -> Self {
        let mut state = Self {
            current_dir,
            root: None,
            entries,
            cursor: 0,
            selected: None,
            rows: Vec::new(),
            history: Vec::new(),
        };
        state.rebuild_rows();
        state
    }

    /// Create a state by reading the filesystem.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = read_directory(&path)?;
        Ok(Self::new(path, entries))
    }

    /// Confine navigation to `root` and below.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Widget rows mirroring the entry list, cursor row `SELECTED`.
    #[must_use]
    pub fn rows(&self) -> &[Widget] {
        &self.rows
    }

    /// Move cursor up.
    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.mark_cursor();
        }
    }

    /// Move cursor down.
    pub fn cursor_down(&mut self) {
        if !self.entries.is_empty() && self.cursor < self.entries.len() - 1 {
            self.cursor += 1;
            self.mark_cursor();
        }
    }

    /// Move cursor to the first entry.
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
        self.mark_cursor();
    }

    /// Move cursor to the last entry.
    pub fn cursor_end(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = self.entries.len() - 1;
            self.mark_cursor();
        }
    }

    /// Enter the cursor entry.
    ///
    /// On a directory, navigates into it and returns `Ok(true)`. On a
    /// file, records it as [`selected`](Self::selected) and returns
    /// `Ok(false)`. The listing is read before any state changes, so a
    /// read failure leaves the state untouched.
    pub fn enter(&mut self) -> std::io::Result<bool> {
        let Some(entry) = self.entries.get(self.cursor) else {
            return Ok(false);
        };

        if !entry.is_dir {
            self.selected = Some(entry.path.clone());
            return Ok(false);
        }

        let next_dir = entry.path.clone();
        let next_entries = read_directory(&next_dir)?;

        self.history.push((self.current_dir.clone(), self.cursor));
        self.current_dir = next_dir;
        self.entries = next_entries;
        self.cursor = 0;
        self.rebuild_rows();
        Ok(true)
    }

    /// Go back to the previous directory (history first, then the
    /// filesystem parent). Blocked at the confinement root.
    pub fn go_back(&mut self) -> std::io::Result<bool> {
        if let Some(root) = &self.root
            && self.current_dir == *root
        {
            return Ok(false);
        }

        if let Some((prev_dir, prev_cursor)) = self.history.pop() {
            let entries = read_directory(&prev_dir)?;
            self.current_dir = prev_dir;
            self.entries = entries;
            self.cursor = prev_cursor.min(self.entries.len().saturating_sub(1));
            self.rebuild_rows();
            return Ok(true);
        }

        let Some(parent) = self.current_dir.parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        if let Some(root) = &self.root
            && !parent.starts_with(root)
        {
            return Ok(false);
        }

        let entries = read_directory(&parent)?;
        self.current_dir = parent;
        self.entries = entries;
        self.cursor = 0;
        self.rebuild_rows();
        Ok(true)
    }

    /// Re-read the current directory and reconcile the rows.
    ///
    /// The cursor clamps to the new entry count; rows for unchanged
    /// entries keep their identity.
    pub fn refresh(&mut self) -> std::io::Result<ReconcileStats> {
        self.entries = read_directory(&self.current_dir)?;
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        Ok(self.rebuild_rows())
    }

    fn rebuild_rows(&mut self) -> ReconcileStats {
        let plan: Vec<ChildSpec> = self.entries.iter().map(row_spec).collect();
        let entries = &self.entries;
        let stats = reconcile_children(&mut self.rows, &plan, |i, spec| {
            Some(Widget::new(spec.kind, spec.name.clone()).with_text(entries[i].name.clone()))
        });
        self.mark_cursor();
        stats
    }

    fn mark_cursor(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.flags.set(WidgetFlags::SELECTED, i == self.cursor);
        }
    }
}
