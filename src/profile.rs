//! User profile tab routing.
//!
//! DESIGN
//! ======
//! The profile page is one active-tab key mapped to a URL segment
//! (`/user-profile/:section?`). Selection is either *controlled* (the URL
//! owns the key; clicking a tab asks the caller to navigate) or
//! *uncontrolled* (the tab set owns the key and assigns it directly).
//! There are no transition guards beyond tab visibility: admin-only tabs
//! are never visible to regular users, and any segment that does not name
//! a visible tab resolves to the first visible tab.

use serde::Serialize;

pub const PROFILE_BASE_PATH: &str = "/user-profile";

/// Tabs of the user profile page, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTab {
    Analytics,
    Personal,
    Bookings,
    Payments,
    Promotions,
}

impl ProfileTab {
    pub const ALL: [Self; 5] = [Self::Analytics, Self::Personal, Self::Bookings, Self::Payments, Self::Promotions];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Analytics => "analytics",
            Self::Personal => "personal",
            Self::Bookings => "bookings",
            Self::Payments => "payments",
            Self::Promotions => "promotions",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Analytics => "Analytics",
            Self::Personal => "Personal Details",
            Self::Bookings => "Bookings",
            Self::Payments => "Payment details",
            Self::Promotions => "Promotions",
        }
    }

    /// URL segment under `/user-profile/`. Identical to the key.
    #[must_use]
    pub fn segment(self) -> &'static str {
        self.key()
    }

    #[must_use]
    pub fn path(self) -> String {
        format!("{PROFILE_BASE_PATH}/{}", self.segment())
    }

    #[must_use]
    pub fn admin_only(self) -> bool {
        matches!(self, Self::Analytics | Self::Promotions)
    }

    /// Exact, case-insensitive segment lookup. Surrounding slashes are ignored.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        let segment = segment.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|tab| tab.segment().eq_ignore_ascii_case(segment))
    }
}

/// Tabs visible to a user, in display order.
#[must_use]
pub fn visible_tabs(is_admin: bool) -> Vec<ProfileTab> {
    ProfileTab::ALL
        .into_iter()
        .filter(|tab| is_admin || !tab.admin_only())
        .collect()
}

// =============================================================================
// TAB SET
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Controlled { active: ProfileTab },
    Uncontrolled { internal: ProfileTab },
}

/// Outcome of a tab click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabEvent {
    /// Uncontrolled: the active tab changed in place.
    Switched(ProfileTab),
    /// Controlled: the caller should navigate here; the active tab follows the URL.
    Navigate(String),
    /// The requested tab is not visible to this user.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabSet {
    tabs: Vec<ProfileTab>,
    mode: Mode,
}

impl TabSet {
    /// Uncontrolled tab set; the first visible tab starts active.
    #[must_use]
    pub fn uncontrolled(is_admin: bool) -> Self {
        let tabs = visible_tabs(is_admin);
        let internal = tabs[0];
        Self { tabs, mode: Mode::Uncontrolled { internal } }
    }

    /// Controlled tab set driven by a URL segment (`None` for `/user-profile`).
    #[must_use]
    pub fn controlled(is_admin: bool, segment: Option<&str>) -> Self {
        let tabs = visible_tabs(is_admin);
        let mut set = Self { mode: Mode::Controlled { active: tabs[0] }, tabs };
        set.sync_segment(segment);
        set
    }

    #[must_use]
    pub fn tabs(&self) -> &[ProfileTab] {
        &self.tabs
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        matches!(self.mode, Mode::Controlled { .. })
    }

    #[must_use]
    pub fn current(&self) -> ProfileTab {
        match self.mode {
            Mode::Controlled { active } => active,
            Mode::Uncontrolled { internal } => internal,
        }
    }

    #[must_use]
    pub fn is_active(&self, tab: ProfileTab) -> bool {
        self.current() == tab
    }

    /// Handle a tab click.
    pub fn select(&mut self, tab: ProfileTab) -> TabEvent {
        if !self.tabs.contains(&tab) {
            return TabEvent::Ignored;
        }
        match &mut self.mode {
            Mode::Controlled { .. } => TabEvent::Navigate(tab.path()),
            Mode::Uncontrolled { internal } => {
                *internal = tab;
                TabEvent::Switched(tab)
            }
        }
    }

    /// Controlled mode: the URL changed, follow it.
    pub fn sync_segment(&mut self, segment: Option<&str>) {
        if let Mode::Controlled { active } = &mut self.mode {
            *active = resolve(&self.tabs, segment);
        }
    }
}

fn resolve(tabs: &[ProfileTab], segment: Option<&str>) -> ProfileTab {
    segment
        .and_then(ProfileTab::from_segment)
        .filter(|tab| tabs.contains(tab))
        .unwrap_or(tabs[0])
}

// =============================================================================
// WIRE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct TabView {
    pub key: &'static str,
    pub label: &'static str,
    pub path: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct SectionsView {
    pub active: &'static str,
    /// Whether the active tab follows the URL.
    pub controlled: bool,
    pub tabs: Vec<TabView>,
}

impl From<&TabSet> for SectionsView {
    fn from(set: &TabSet) -> Self {
        Self {
            active: set.current().key(),
            controlled: set.is_controlled(),
            tabs: set
                .tabs()
                .iter()
                .map(|tab| TabView { key: tab.key(), label: tab.label(), path: tab.path(), active: set.is_active(*tab) })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
