//! The MyStuff view: state, view selection and the render model.
//!
//! ## Architecture
//!
//! - The owner holds canonical data and passes it in as [`MyStuffProps`]
//! - [`MyStuffState`] mirrors `search` and `folder` into debounced cells
//! - [`render`] is a pure function from props and state to a [`MyStuffView`]
//!
//! Nothing here touches a UI toolkit; the GPUI layer walks the returned tree.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::debounce::{Debounced, DEFAULT_DELAY};
use crate::element::ElementRow;
use crate::intent::{ImportInput, MyStuffIntent};
use crate::item::Folders;
use crate::listing::{self, FolderItem, ItemGroup, LATEST_COUNT};

/// Placeholder shown when a listing has no items.
pub const EMPTY_PLACEHOLDER: &str = "Nothing here yet";

/// Search bar placeholder outside a folder.
pub const SEARCH_PLACEHOLDER: &str = "Search...";

// =============================================================================
// Props
// =============================================================================

/// Data passed down by the owner on every render.
#[derive(Debug, Clone, Default)]
pub struct MyStuffProps {
    pub folders: Folders,
    pub search: String,
    pub can_go_back: bool,
    pub folder: Option<String>,
}

/// Tunables for the view.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub debounce: Duration,
    pub latest_count: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DELAY,
            latest_count: LATEST_COUNT,
        }
    }
}

// =============================================================================
// View Selection
// =============================================================================

/// Which of the three views is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Where {
    /// Top level: the list of folders.
    Folders,
    /// Contents of one folder.
    Folder,
    /// Results across all folders.
    Search,
}

/// Search wins over an open folder; an empty folder name counts as none.
pub fn where_for(search: &str, folder: Option<&str>) -> Where {
    if !search.is_empty() {
        Where::Search
    } else if folder.is_some_and(|f| !f.is_empty()) {
        Where::Folder
    } else {
        Where::Folders
    }
}

// =============================================================================
// State
// =============================================================================

/// Component-owned state: the debounced mirrors and the import control.
#[derive(Debug)]
pub struct MyStuffState {
    search: Debounced<String>,
    folder: Debounced<Option<String>>,
    seen_search: String,
    seen_folder: Option<String>,
    import: ImportInput,
    options: ViewOptions,
}

impl MyStuffState {
    /// Start from the props' values, already applied.
    pub fn new(props: &MyStuffProps, options: ViewOptions) -> Self {
        Self {
            search: Debounced::new(props.search.clone(), options.debounce),
            folder: Debounced::new(props.folder.clone(), options.debounce),
            seen_search: props.search.clone(),
            seen_folder: props.folder.clone(),
            import: ImportInput::new(),
            options,
        }
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    /// Debounced search term.
    pub fn search(&self) -> &str {
        self.search.get()
    }

    /// Debounced open folder.
    pub fn folder(&self) -> Option<&str> {
        self.folder.get().as_deref()
    }

    pub fn where_(&self) -> Where {
        where_for(self.search(), self.folder())
    }

    /// Mirror new props; only values that changed since the last props are
    /// scheduled.
    pub fn receive_props(&mut self, props: &MyStuffProps, now: Instant) {
        if props.search != self.seen_search {
            self.seen_search = props.search.clone();
            self.search.schedule(props.search.clone(), now);
        }
        if props.folder != self.seen_folder {
            self.seen_folder = props.folder.clone();
            self.folder.schedule(props.folder.clone(), now);
        }
    }

    /// Typing in the search bar. Searching always leaves the open folder.
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.schedule(text.into(), now);
        self.folder.schedule(None, now);
    }

    /// The back affordance: return to the folder list.
    pub fn go_back(&mut self, now: Instant) {
        self.folder.schedule(None, now);
        self.search.schedule(String::new(), now);
    }

    /// Open a folder from the folder list.
    pub fn open_folder(&mut self, folder: impl Into<String>, now: Instant) {
        self.folder.schedule(Some(folder.into()), now);
    }

    /// Apply whatever is due. Returns `true` when anything changed.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        let search = self.search.flush_due(now);
        let folder = self.folder.flush_due(now);
        if search || folder {
            tracing::debug!(
                "debounced state applied: search='{}', folder={:?}",
                self.search(),
                self.folder()
            );
        }
        search || folder
    }

    /// Earliest pending deadline across both cells.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search.deadline(), self.folder.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Pending deadline of the search cell.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Pending deadline of the folder cell.
    pub fn folder_deadline(&self) -> Option<Instant> {
        self.folder.deadline()
    }

    /// Drop pending updates (teardown).
    pub fn cancel(&mut self) {
        self.search.cancel();
        self.folder.cancel();
    }

    /// Forward an import picker result for the open folder.
    ///
    /// Returns `None` outside the folder view.
    pub fn import(&mut self, files: Option<Vec<PathBuf>>) -> Option<MyStuffIntent> {
        if self.where_() != Where::Folder {
            return None;
        }
        let folder = self.folder()?.to_string();
        Some(self.import.change(&folder, files))
    }

    /// Pending import selection; always empty between changes.
    pub fn import_value(&self) -> Option<&[PathBuf]> {
        self.import.value()
    }
}

// =============================================================================
// Render Model
// =============================================================================

/// Left-hand affordance of the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leading {
    Logo,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchBar {
    pub leading: Leading,
    pub placeholder: String,
    /// Debounced search term.
    pub value: String,
}

/// A titled block of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub count: usize,
    pub rows: Vec<ElementRow>,
}

/// A grouped listing, or the empty placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Empty,
    Groups(Vec<Section>),
}

impl Listing {
    fn from_entries(entries: &[FolderItem], display_type: bool) -> Self {
        let groups = listing::group_items(entries);
        if groups.is_empty() {
            return Listing::Empty;
        }
        Listing::Groups(
            groups
                .into_iter()
                .map(|group| section(group, display_type))
                .collect(),
        )
    }

    /// Number of item rows.
    pub fn row_count(&self) -> usize {
        match self {
            Listing::Empty => 0,
            Listing::Groups(sections) => sections.iter().map(|s| s.rows.len()).sum(),
        }
    }
}

fn section(group: ItemGroup<FolderItem>, display_type: bool) -> Section {
    Section {
        count: group.len(),
        title: group.label,
        rows: group
            .items
            .into_iter()
            .map(|entry| ElementRow::new(entry.folder, entry.item, display_type))
            .collect(),
    }
}

/// The view-specific body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Folders(Vec<String>),
    Folder {
        folder: String,
        /// Absent when the folder is empty.
        latest: Option<Section>,
        listing: Listing,
    },
    Search {
        listing: Listing,
    },
}

/// Everything the view shows for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct MyStuffView {
    pub search_bar: SearchBar,
    pub body: Body,
}

impl MyStuffView {
    pub fn where_(&self) -> Where {
        match self.body {
            Body::Folders(_) => Where::Folders,
            Body::Folder { .. } => Where::Folder,
            Body::Search { .. } => Where::Search,
        }
    }
}

/// Build the render model from props and debounced state.
pub fn render(props: &MyStuffProps, state: &MyStuffState) -> MyStuffView {
    let where_ = state.where_();

    let leading = if where_ == Where::Folders || !props.can_go_back {
        Leading::Logo
    } else {
        Leading::Back
    };
    let search_bar = SearchBar {
        leading,
        placeholder: state
            .folder()
            .filter(|f| !f.is_empty())
            .unwrap_or(SEARCH_PLACEHOLDER)
            .to_string(),
        value: state.search().to_string(),
    };

    let body = match where_ {
        Where::Folders => Body::Folders(props.folders.names().map(str::to_string).collect()),
        Where::Folder => {
            let folder = state.folder().unwrap_or_default().to_string();
            render_folder(&props.folders, folder, state.options().latest_count)
        }
        Where::Search => {
            let results = listing::search(&props.folders, state.search());
            Body::Search {
                listing: Listing::from_entries(&results, true),
            }
        }
    };

    MyStuffView { search_bar, body }
}

fn render_folder(folders: &Folders, folder: String, latest_count: usize) -> Body {
    let entries: Vec<FolderItem> = folders
        .items(&folder)
        .iter()
        .map(|item| FolderItem {
            folder: folder.clone(),
            item: item.clone(),
        })
        .collect();

    let newest = listing::latest(&entries, latest_count);
    let latest = (!newest.is_empty()).then(|| Section {
        title: "Latest".to_string(),
        count: newest.len(),
        rows: newest
            .into_iter()
            .map(|entry| ElementRow::new(entry.folder, entry.item, false))
            .collect(),
    });

    Body::Folder {
        listing: Listing::from_entries(&entries, false),
        latest,
        folder,
    }
}

// =============================================================================
// Text Outline
// =============================================================================

impl fmt::Display for MyStuffView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leading = match self.search_bar.leading {
            Leading::Logo => "*",
            Leading::Back => "<",
        };
        if self.search_bar.value.is_empty() {
            writeln!(f, "{} [{}]", leading, self.search_bar.placeholder)?;
        } else {
            writeln!(f, "{} {}", leading, self.search_bar.value)?;
        }

        match &self.body {
            Body::Folders(names) => {
                for name in names {
                    writeln!(f, "folder {}", name)?;
                }
            }
            Body::Folder {
                folder,
                latest,
                listing,
            } => {
                writeln!(f, "{}: New | Import", folder)?;
                if let Some(latest) = latest {
                    write_section(f, latest)?;
                }
                write_listing(f, listing)?;
            }
            Body::Search { listing } => write_listing(f, listing)?,
        }
        Ok(())
    }
}

fn write_listing(f: &mut fmt::Formatter<'_>, listing: &Listing) -> fmt::Result {
    match listing {
        Listing::Empty => writeln!(f, "{}", EMPTY_PLACEHOLDER),
        Listing::Groups(sections) => sections.iter().try_for_each(|s| write_section(f, s)),
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, section: &Section) -> fmt::Result {
    writeln!(f, "# {} ({})", section.title, section.count)?;
    for row in &section.rows {
        match row.secondary() {
            Some(kind) => writeln!(
                f,
                "  [{}] {} ({})",
                row.avatar.abbreviation,
                row.item.name,
                kind
            )?,
            None => writeln!(f, "  [{}] {}", row.avatar.abbreviation, row.item.name)?,
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
